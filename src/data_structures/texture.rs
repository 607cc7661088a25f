//! GPU textures and the wgpu texture backend.
//!
//! This module provides [`Texture`], a wrapper around WGPU GPU texture resources,
//! and [`GpuTextures`], the [`TextureBackend`] that owns every scene texture and
//! exposes them to the shader as sixteen numbered units.

use std::{collections::HashMap, num::NonZeroU32};

use image::{
    Rgba, RgbaImage,
    imageops::{self, FilterType},
};

use crate::resources::texture::{
    DecodedImage, LoadError, MAX_TEXTURE_SLOTS, TextureBackend, TextureHandle, WrapMode,
};

/// A GPU texture with a view and sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    /// Colour format for every scene texture. Texels are sampled as stored,
    /// without an sRGB decode.
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Upload `image` with a full mip chain.
    ///
    /// wgpu has no `generateMipmap`, so the levels are downsampled on the CPU
    /// with a triangle filter and written one by one. The caller makes sure the
    /// size fits the device, see [`checked_pixels`].
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
        wrap: WrapMode,
    ) -> Self {
        let (width, height) = image.dimensions();
        let mip_level_count = mip_level_count(width, height);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        write_level(queue, &texture, 0, width, height, image.as_raw());
        for level in 1..mip_level_count {
            let (w, h) = mip_extent(width, height, level);
            let scaled = imageops::resize(image, w, h, FilterType::Triangle);
            write_level(queue, &texture, level, w, h, scaled.as_raw());
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = create_sampler(device, wrap);

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Pixels of `image` if a texture of its size can be created on a device whose
/// 2D textures are at most `max_dimension` texels wide and high.
pub(crate) fn checked_pixels(
    image: &DecodedImage,
    max_dimension: u32,
) -> Result<RgbaImage, String> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 {
        return Err(format!("{width}x{height} image has no pixels"));
    }
    if width > max_dimension || height > max_dimension {
        return Err(format!(
            "{width}x{height} exceeds the device limit of {max_dimension} texels per side"
        ));
    }
    let expected = width as usize * height as usize * 4;
    if image.pixels.len() != expected {
        return Err(format!(
            "{} bytes given for {width}x{height} RGBA pixels, expected {expected}",
            image.pixels.len()
        ));
    }
    RgbaImage::from_raw(width, height, image.pixels.clone())
        .ok_or_else(|| format!("{width}x{height} pixels do not fit an RGBA buffer"))
}

fn write_level(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    mip_level: u32,
    width: u32,
    height: u32,
    rgba: &[u8],
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture,
            mip_level,
            origin: wgpu::Origin3d::ZERO,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// Levels needed to go from `width`x`height` down to 1x1.
pub(crate) fn mip_level_count(width: u32, height: u32) -> u32 {
    u32::BITS - width.max(height).max(1).leading_zeros()
}

pub(crate) fn mip_extent(width: u32, height: u32, level: u32) -> (u32, u32) {
    ((width >> level).max(1), (height >> level).max(1))
}

pub fn create_sampler(device: &wgpu::Device, wrap: WrapMode) -> wgpu::Sampler {
    let address_mode = match wrap {
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    })
}

/// Layout of the texture bind group: unit `i` is a 2D texture at binding `2i`
/// and its sampler at binding `2i + 1`.
pub fn texture_units_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let entries: Vec<wgpu::BindGroupLayoutEntry> = (0..MAX_TEXTURE_SLOTS as u32)
        .flat_map(|unit| {
            [
                wgpu::BindGroupLayoutEntry {
                    binding: unit * 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: unit * 2 + 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ]
        })
        .collect();
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &entries,
        label: Some("texture_units_layout"),
    })
}

/// wgpu implementation of [`TextureBackend`].
///
/// Owns the texture objects behind every [`TextureHandle`] and remembers which
/// handle is bound to which unit. Units without a texture fall back to a 1x1
/// white placeholder so the bind group is always complete.
pub struct GpuTextures {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: HashMap<TextureHandle, Texture>,
    units: [Option<TextureHandle>; MAX_TEXTURE_SLOTS],
    placeholder: Texture,
    next_id: NonZeroU32,
}

impl GpuTextures {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let placeholder = Texture::from_image(
            device,
            queue,
            &RgbaImage::from_pixel(1, 1, Rgba([255; 4])),
            "placeholder texture",
            WrapMode::Repeat,
        );
        Self {
            device: device.clone(),
            queue: queue.clone(),
            textures: HashMap::new(),
            units: [None; MAX_TEXTURE_SLOTS],
            placeholder,
            next_id: NonZeroU32::MIN,
        }
    }

    /// Number of live texture objects.
    pub fn live(&self) -> usize {
        self.textures.len()
    }

    fn unit_texture(&self, unit: usize) -> &Texture {
        self.units[unit]
            .and_then(|handle| self.textures.get(&handle))
            .unwrap_or(&self.placeholder)
    }

    /// Bind group matching [`texture_units_layout`] for the current unit
    /// assignment. Rebuild it after [`TextureBackend::bind`] calls.
    pub fn bind_group(&self, layout: &wgpu::BindGroupLayout) -> wgpu::BindGroup {
        let entries: Vec<wgpu::BindGroupEntry> = (0..MAX_TEXTURE_SLOTS)
            .flat_map(|unit| {
                let texture = self.unit_texture(unit);
                [
                    wgpu::BindGroupEntry {
                        binding: unit as u32 * 2,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: unit as u32 * 2 + 1,
                        resource: wgpu::BindingResource::Sampler(&texture.sampler),
                    },
                ]
            })
            .collect();
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &entries,
            label: Some("texture_units_bind_group"),
        })
    }
}

impl TextureBackend for GpuTextures {
    fn upload(
        &mut self,
        image: &DecodedImage,
        tag: &str,
        wrap: WrapMode,
    ) -> Result<TextureHandle, LoadError> {
        let max_dimension = self.device.limits().max_texture_dimension_2d;
        let pixels =
            checked_pixels(image, max_dimension).map_err(|reason| LoadError::UploadFailed {
                tag: tag.to_string(),
                reason,
            })?;
        let texture = Texture::from_image(&self.device, &self.queue, &pixels, tag, wrap);
        let handle = TextureHandle::from(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.textures.insert(handle, texture);
        log::debug!("Uploaded `{tag}` ({}x{})", image.width, image.height);
        Ok(handle)
    }

    fn bind(&mut self, unit: u32, handle: TextureHandle) {
        match self.units.get_mut(unit as usize) {
            Some(slot) => *slot = Some(handle),
            None => log::error!("Texture unit {unit} does not exist"),
        }
    }

    fn release(&mut self, handle: TextureHandle) {
        if let Some(texture) = self.textures.remove(&handle) {
            texture.texture.destroy();
        }
        for unit in self.units.iter_mut() {
            if *unit == Some(handle) {
                *unit = None;
            }
        }
    }
}
