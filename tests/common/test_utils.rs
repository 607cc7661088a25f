use std::path::{Path, PathBuf};

use scene_ngin::{
    LoadError, MeshKind, TextureBackend, UniformSink,
    cgmath::{Matrix4, Vector2, Vector3, Vector4},
    context::GpuContext,
    render::{BlendControl, MeshDraw},
    resources::texture::{DecodedImage, TextureHandle, WrapMode},
};

/// What a [`RecordingBackend`] was asked to upload.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Upload {
    pub(crate) handle: TextureHandle,
    pub(crate) tag: String,
    pub(crate) wrap: WrapMode,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) channels: u8,
}

/// Texture backend double that hands out sequential handles and remembers
/// every call. With a size limit it refuses larger images the way a device
/// would.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub(crate) uploads: Vec<Upload>,
    pub(crate) binds: Vec<(u32, TextureHandle)>,
    pub(crate) releases: Vec<TextureHandle>,
    pub(crate) refused: Vec<String>,
    max_dimension: Option<u32>,
    next_id: u32,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: Some(max_dimension),
            ..Self::default()
        }
    }

    pub(crate) fn live(&self) -> usize {
        self.uploads.len() - self.releases.len()
    }
}

impl TextureBackend for RecordingBackend {
    fn upload(
        &mut self,
        image: &DecodedImage,
        tag: &str,
        wrap: WrapMode,
    ) -> Result<TextureHandle, LoadError> {
        if let Some(max) = self.max_dimension
            && (image.width > max || image.height > max)
        {
            self.refused.push(tag.to_string());
            return Err(LoadError::UploadFailed {
                tag: tag.to_string(),
                reason: format!("{}x{} is larger than {max}", image.width, image.height),
            });
        }
        self.next_id += 1;
        let handle = TextureHandle::new(self.next_id).expect("ids start at 1");
        self.uploads.push(Upload {
            handle,
            tag: tag.to_string(),
            wrap,
            width: image.width,
            height: image.height,
            channels: image.channels,
        });
        Ok(handle)
    }

    fn bind(&mut self, unit: u32, handle: TextureHandle) {
        self.binds.push((unit, handle));
    }

    fn release(&mut self, handle: TextureHandle) {
        self.releases.push(handle);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Value {
    Mat4(Matrix4<f32>),
    Vec2(Vector2<f32>),
    Vec3(Vector3<f32>),
    Vec4(Vector4<f32>),
    Float(f32),
    Int(i32),
    Bool(bool),
    Sampler(i32),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Event {
    Uniform(String, Value),
    Draw(MeshKind),
    Blend(bool),
}

/// Uniform sink and draw target that logs every call in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub(crate) events: Vec<Event>,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn uniforms(&self) -> Vec<(&str, Value)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Uniform(name, value) => Some((name.as_str(), *value)),
                _ => None,
            })
            .collect()
    }

    /// Last value written under `name`.
    pub(crate) fn last(&self, name: &str) -> Option<Value> {
        self.uniforms()
            .into_iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub(crate) fn last_bool(&self, name: &str) -> Option<bool> {
        match self.last(name)? {
            Value::Bool(b) => Some(b),
            other => panic!("`{name}` holds {other:?}, not a bool"),
        }
    }

    pub(crate) fn last_sampler(&self, name: &str) -> Option<i32> {
        match self.last(name)? {
            Value::Sampler(unit) => Some(unit),
            other => panic!("`{name}` holds {other:?}, not a sampler"),
        }
    }

    pub(crate) fn draws(&self) -> Vec<MeshKind> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Draw(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }

    fn push(&mut self, name: &str, value: Value) {
        self.events.push(Event::Uniform(name.to_string(), value));
    }
}

impl UniformSink for RecordingSink {
    fn set_mat4(&mut self, name: &str, value: Matrix4<f32>) {
        self.push(name, Value::Mat4(value));
    }

    fn set_vec2(&mut self, name: &str, value: Vector2<f32>) {
        self.push(name, Value::Vec2(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        self.push(name, Value::Vec3(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vector4<f32>) {
        self.push(name, Value::Vec4(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.push(name, Value::Float(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.push(name, Value::Int(value));
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.push(name, Value::Bool(value));
    }

    fn set_sampler(&mut self, name: &str, unit: i32) {
        self.push(name, Value::Sampler(unit));
    }
}

impl MeshDraw for RecordingSink {
    fn draw_mesh(&mut self, mesh: MeshKind) {
        self.events.push(Event::Draw(mesh));
    }
}

impl BlendControl for RecordingSink {
    fn set_blending(&mut self, enabled: bool) {
        self.events.push(Event::Blend(enabled));
    }
}

/// Writes a solid RGBA PNG into `dir`.
pub(crate) fn write_rgba_png(dir: &Path, name: &str, size: u32, rgba: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(size, size, image::Rgba(rgba))
        .save(&path)
        .expect("fixture png should be writable");
    path
}

/// Writes a solid RGB PNG (no alpha channel) into `dir`.
pub(crate) fn write_rgb_png(dir: &Path, name: &str, size: u32, rgb: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(size, size, image::Rgb(rgb))
        .save(&path)
        .expect("fixture png should be writable");
    path
}

/// Writes a file with an image extension but no image inside.
pub(crate) fn write_garbage(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"definitely not an image").expect("fixture should be writable");
    path
}

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Device on wgpu's noop backend. Every call is validated like on real
/// hardware, nothing is executed, and no adapter is needed.
pub(crate) fn noop_gpu() -> GpuContext {
    let (device, queue) = wgpu::Device::noop(&wgpu::DeviceDescriptor {
        label: Some("noop test device"),
        ..Default::default()
    });
    GpuContext { device, queue }
}
