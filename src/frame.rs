//! Recording and replaying a frame on wgpu.
//!
//! GL-style code writes uniforms and draws immediately. wgpu wants every buffer
//! write done before the render pass runs, so [`FrameRecorder`] plays the role
//! of the uniform sink during sequencing: it keeps the current shader state in
//! CPU-side blocks laid out exactly like the WGSL structs, and snapshots the
//! object block whenever a mesh is drawn. [`FrameRecorder::submit`] then copies
//! all snapshots into one uniform buffer and replays the draws with dynamic
//! offsets, switching to the blended pipeline wherever blending was on.

use cgmath::{Deg, EuclideanSpace, Matrix, Matrix4, Point3, SquareMatrix, Vector2, Vector3, Vector4};
use wgpu::util::DeviceExt;

use crate::{
    context::GpuContext,
    pipelines::{
        scene::ScenePipelines,
        uniforms::{self, MAX_POINT_LIGHTS, PointLightField, UniformKind, UniformSink},
    },
    render::{BlendControl, MeshDraw, MeshKind},
};

/// Per-draw uniform block (`Object` in the shader).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub uv_scale: [f32; 2],
    pub use_texture: u32,
    pub texture_unit: i32,
    pub diffuse_color: [f32; 3],
    pub shininess: f32,
    pub specular_color: [f32; 3],
    pub use_lighting: u32,
}

impl Default for ObjectUniform {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::identity().into();
        Self {
            model: identity,
            normal: identity,
            color: [1.0; 4],
            uv_scale: [1.0; 2],
            use_texture: 0,
            texture_unit: crate::resources::texture::NOT_FOUND,
            diffuse_color: [1.0; 3],
            shininess: 1.0,
            specular_color: [0.0; 3],
            use_lighting: 0,
        }
    }
}

/// One entry of the shader's `lights` array.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 3],
    pub constant: f32,
    pub ambient: [f32; 3],
    pub linear: f32,
    pub diffuse: [f32; 3],
    pub quadratic: f32,
    pub specular: [f32; 3],
    pub enabled: u32,
}

/// Per-frame uniform block (`Frame` in the shader).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    pub lights: [PointLightUniform; MAX_POINT_LIGHTS],
}

impl FrameUniform {
    fn new(view: &View, lights: [PointLightUniform; MAX_POINT_LIGHTS]) -> Self {
        Self {
            view_proj: view.view_proj.into(),
            view_position: [view.eye.x, view.eye.y, view.eye.z, 1.0],
            lights,
        }
    }
}

/// Maps OpenGL clip space depth (-1..1) onto wgpu's (0..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Camera input for a frame. Where it comes from is up to the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub view_proj: Matrix4<f32>,
    pub eye: Vector3<f32>,
}

impl View {
    /// Right-handed perspective camera at `eye` looking at `target`, +Y up.
    pub fn look_at(eye: Point3<f32>, target: Point3<f32>, aspect: f32, fovy: Deg<f32>) -> Self {
        let view = Matrix4::look_at_rh(eye, target, Vector3::unit_y());
        let proj = cgmath::perspective(fovy, aspect, 0.1, 500.0);
        Self {
            view_proj: OPENGL_TO_WGPU_MATRIX * proj * view,
            eye: eye.to_vec(),
        }
    }
}

/// A recorded draw: which mesh, with which object state, blended or not.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    pub mesh: MeshKind,
    pub blended: bool,
    pub object: ObjectUniform,
}

/// GPU buffers for one primitive mesh.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

/// Provides geometry for each [`MeshKind`].
pub trait MeshGeometry {
    fn mesh(&self, kind: MeshKind) -> Option<&GpuMesh>;
}

/// Everything [`FrameRecorder::submit`] needs besides the recorder itself.
pub struct FrameTargets<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
    pub clear_colour: wgpu::Color,
}

#[derive(Debug, Default)]
pub struct FrameRecorder {
    current: ObjectUniform,
    lights: [PointLightUniform; MAX_POINT_LIGHTS],
    blending: bool,
    commands: Vec<DrawCommand>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the previous frame's draws. Shader state carries over, just like
    /// uniforms on a GL program.
    pub fn begin_frame(&mut self) {
        self.commands.clear();
        self.blending = false;
    }

    pub fn current(&self) -> &ObjectUniform {
        &self.current
    }

    pub fn lights(&self) -> &[PointLightUniform; MAX_POINT_LIGHTS] {
        &self.lights
    }

    pub fn blending(&self) -> bool {
        self.blending
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    fn accepts(&self, name: &str, kind: UniformKind) -> bool {
        match uniforms::expected_kind(name) {
            Some(expected) if expected == kind => true,
            Some(expected) => {
                log::warn!("Uniform `{name}` is {expected:?}, got a {kind:?} write");
                false
            }
            None => {
                log::warn!("Uniform `{name}` is not part of the scene shader");
                false
            }
        }
    }

    fn light_vec3(&mut self, name: &str, value: Vector3<f32>) {
        let Some((index, field)) = uniforms::parse_point_light_name(name) else {
            return;
        };
        let light = &mut self.lights[index];
        let value: [f32; 3] = value.into();
        match field {
            PointLightField::Position => light.position = value,
            PointLightField::Ambient => light.ambient = value,
            PointLightField::Diffuse => light.diffuse = value,
            PointLightField::Specular => light.specular = value,
            _ => {}
        }
    }

    fn light_float(&mut self, name: &str, value: f32) {
        let Some((index, field)) = uniforms::parse_point_light_name(name) else {
            return;
        };
        let light = &mut self.lights[index];
        match field {
            PointLightField::Constant => light.constant = value,
            PointLightField::Linear => light.linear = value,
            PointLightField::Quadratic => light.quadratic = value,
            _ => {}
        }
    }

    /// Uploads the recorded frame and replays it into `targets`.
    pub fn submit(
        &self,
        gpu: &GpuContext,
        pipelines: &ScenePipelines,
        texture_units: &wgpu::BindGroup,
        meshes: &dyn MeshGeometry,
        view: &View,
        targets: FrameTargets<'_>,
    ) {
        let device = &gpu.device;
        let frame_uniform = FrameUniform::new(view, self.lights);
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: bytemuck::cast_slice(&[frame_uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &pipelines.frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
            label: Some("frame_bind_group"),
        });

        let stride = object_stride(device.limits().min_uniform_buffer_offset_alignment);
        let object_bytes = pack_objects(&self.commands, stride);
        let object_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Uniform Buffer"),
            contents: &object_bytes,
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &pipelines.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &object_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniform>() as u64),
                }),
            }],
            label: Some("object_bind_group"),
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Scene Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: targets.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(targets.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            render_pass.set_bind_group(0, &frame_bind_group, &[]);
            render_pass.set_bind_group(2, texture_units, &[]);

            let mut bound_blend: Option<bool> = None;
            for (i, command) in self.commands.iter().enumerate() {
                let Some(mesh) = meshes.mesh(command.mesh) else {
                    log::warn!("No geometry for {:?}; draw skipped", command.mesh);
                    continue;
                };
                if bound_blend != Some(command.blended) {
                    let pipeline = if command.blended {
                        &pipelines.blended
                    } else {
                        &pipelines.opaque
                    };
                    render_pass.set_pipeline(pipeline);
                    bound_blend = Some(command.blended);
                }
                let offset = (i as u64 * stride) as wgpu::DynamicOffset;
                render_pass.set_bind_group(1, &object_bind_group, &[offset]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.num_elements, 0, 0..1);
            }
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        log::debug!("Submitted {} draws", self.commands.len());
    }
}

/// Distance between two object blocks in the uniform buffer.
pub(crate) fn object_stride(min_alignment: u32) -> u64 {
    let size = std::mem::size_of::<ObjectUniform>() as u64;
    let align = u64::from(min_alignment.max(1));
    size.div_ceil(align) * align
}

/// Lays the recorded object blocks out `stride` bytes apart. Always yields at
/// least one block so the buffer binding is valid for an empty frame.
pub(crate) fn pack_objects(commands: &[DrawCommand], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; stride * commands.len().max(1)];
    for (i, command) in commands.iter().enumerate() {
        let block = bytemuck::bytes_of(&command.object);
        bytes[i * stride..i * stride + block.len()].copy_from_slice(block);
    }
    bytes
}

impl UniformSink for FrameRecorder {
    fn set_mat4(&mut self, name: &str, value: Matrix4<f32>) {
        if !self.accepts(name, UniformKind::Mat4) {
            return;
        }
        self.current.model = value.into();
        let normal = value.invert().map(|m| m.transpose()).unwrap_or(value);
        self.current.normal = normal.into();
    }

    fn set_vec2(&mut self, name: &str, value: Vector2<f32>) {
        if self.accepts(name, UniformKind::Vec2) {
            self.current.uv_scale = value.into();
        }
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        if !self.accepts(name, UniformKind::Vec3) {
            return;
        }
        if name == uniforms::MATERIAL_DIFFUSE.name() {
            self.current.diffuse_color = value.into();
        } else if name == uniforms::MATERIAL_SPECULAR.name() {
            self.current.specular_color = value.into();
        } else {
            self.light_vec3(name, value);
        }
    }

    fn set_vec4(&mut self, name: &str, value: Vector4<f32>) {
        if self.accepts(name, UniformKind::Vec4) {
            self.current.color = value.into();
        }
    }

    fn set_float(&mut self, name: &str, value: f32) {
        if !self.accepts(name, UniformKind::Float) {
            return;
        }
        if name == uniforms::MATERIAL_SHININESS.name() {
            self.current.shininess = value;
        } else {
            self.light_float(name, value);
        }
    }

    fn set_int(&mut self, name: &str, _value: i32) {
        // The scene shader declares no plain integer uniforms.
        self.accepts(name, UniformKind::Int);
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        if !self.accepts(name, UniformKind::Bool) {
            return;
        }
        if name == uniforms::USE_TEXTURE.name() {
            self.current.use_texture = value.into();
        } else if name == uniforms::USE_LIGHTING.name() {
            self.current.use_lighting = value.into();
        } else if let Some((index, PointLightField::Active)) =
            uniforms::parse_point_light_name(name)
        {
            self.lights[index].enabled = value.into();
        }
    }

    fn set_sampler(&mut self, name: &str, unit: i32) {
        if self.accepts(name, UniformKind::Sampler) {
            self.current.texture_unit = unit;
        }
    }
}

impl MeshDraw for FrameRecorder {
    fn draw_mesh(&mut self, mesh: MeshKind) {
        self.commands.push(DrawCommand {
            mesh,
            blended: self.blending,
            object: self.current,
        });
    }
}

impl BlendControl for FrameRecorder {
    fn set_blending(&mut self, enabled: bool) {
        self.blending = enabled;
    }
}
