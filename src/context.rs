use std::time::Duration;

use anyhow::{Context as _, anyhow};
use serde::{Deserialize, Serialize};

use crate::data_structures::texture::Texture;

/// Runtime knobs for a headless render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub clear_colour: [f64; 4],
}

impl RenderConfig {
    pub fn clear_colour(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_colour;
        wgpu::Color { r, g, b, a }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            clear_colour: [0.1, 0.2, 0.3, 1.0],
        }
    }
}

/// Device and queue without a surface.
#[derive(Debug)]
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    pub async fn headless() -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("No graphics adapter available")?;
        let info = adapter.get_info();
        log::info!("Using adapter \"{}\" ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("scene-ngin device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .context("Failed to create logical device")?;

        Ok(Self { device, queue })
    }
}

/// Colour and depth textures to render into when there is no window.
pub struct OffscreenTarget {
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth: Texture,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    /// Linear 8-bit RGBA. Shader output is stored as written, with no sRGB
    /// encode on the way out.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Colour Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = Texture::create_depth_texture(device, [width, height], "offscreen_depth");
        Self {
            color,
            color_view,
            depth,
            width,
            height,
        }
    }

    /// Copies the colour texture back to the CPU.
    pub async fn read_pixels(&self, gpu: &GpuContext) -> anyhow::Result<image::RgbaImage> {
        let unpadded = 4 * self.width;
        let padded = padded_bytes_per_row(self.width);
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Offscreen Readback Buffer"),
            size: u64::from(padded) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        gpu.queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = futures::channel::oneshot::channel();
        let slice = buffer.slice(..);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        gpu.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(Duration::from_secs(3)),
            })
            .map_err(|e| anyhow!("Device poll failed: {e}"))?;
        rx.await
            .context("Readback callback dropped")?
            .context("Failed to map readback buffer")?;

        let pixels = {
            let data = slice.get_mapped_range();
            strip_row_padding(&data, unpadded as usize, padded as usize, self.height as usize)
        };
        buffer.unmap();

        image::RgbaImage::from_raw(self.width, self.height, pixels)
            .context("Readback size does not match the target")
    }
}

/// Texture-to-buffer copies need rows aligned to `COPY_BYTES_PER_ROW_ALIGNMENT`.
pub(crate) fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = 4 * width;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

pub(crate) fn strip_row_padding(
    data: &[u8],
    unpadded: usize,
    padded: usize,
    rows: usize,
) -> Vec<u8> {
    data.chunks(padded)
        .take(rows)
        .flat_map(|row| &row[..unpadded])
        .copied()
        .collect()
}
