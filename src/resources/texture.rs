use std::{
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

/// Number of texture units the scene shader can bind at once.
pub const MAX_TEXTURE_SLOTS: usize = 16;

/// Unit value handed to the shader when a tag does not resolve.
pub const NOT_FOUND: i32 = -1;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to decode texture image {}: {source}", path.display())]
    DecodeFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture table is full ({capacity} slots), cannot register `{tag}`")]
    Capacity { tag: String, capacity: usize },
    #[error("texture tag `{0}` is already registered")]
    DuplicateTag(String),
    #[error("cannot upload texture `{tag}`: {reason}")]
    UploadFailed { tag: String, reason: String },
}

/// Pixels ready for upload.
///
/// Rows are stored bottom-up (flipped vertically on decode) and always expanded
/// to RGBA8. `channels` remembers what the source had: anything but 4 is treated
/// as opaque and its alpha forced to 255.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| LoadError::DecodeFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_dynamic(img))
    }

    pub fn from_dynamic(img: DynamicImage) -> Self {
        let channels = img.color().channel_count();
        let (width, height) = img.dimensions();
        let mut pixels = img.flipv().to_rgba8().into_raw();
        if channels != 4 {
            pixels.chunks_exact_mut(4).for_each(|px| px[3] = u8::MAX);
        }
        Self {
            width,
            height,
            channels,
            pixels,
        }
    }

    /// A single-colour image, mostly useful as a placeholder.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            channels: 4,
            pixels,
        }
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

/// Picks the wrap mode from the texture tag.
///
/// Decals and photos that are not tileable (by default `panda` and `thinkpad`)
/// clamp to avoid seams along their borders; everything else repeats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrapPolicy {
    clamp_tags: Vec<String>,
}

impl WrapPolicy {
    pub fn new<I, T>(clamp_tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            clamp_tags: clamp_tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn mode_for(&self, tag: &str) -> WrapMode {
        if self.clamp_tags.iter().any(|t| t == tag) {
            WrapMode::ClampToEdge
        } else {
            WrapMode::Repeat
        }
    }
}

impl Default for WrapPolicy {
    fn default() -> Self {
        Self::new(["panda", "thinkpad"])
    }
}

/// Opaque id of a GPU texture object. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(NonZeroU32);

impl TextureHandle {
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl From<NonZeroU32> for TextureHandle {
    fn from(id: NonZeroU32) -> Self {
        Self(id)
    }
}

/// GPU side of the texture table.
pub trait TextureBackend {
    /// Creates a mipmapped 2D texture from `image`.
    ///
    /// Images the device cannot hold are refused with
    /// [`LoadError::UploadFailed`] instead of being created.
    fn upload(
        &mut self,
        image: &DecodedImage,
        tag: &str,
        wrap: WrapMode,
    ) -> Result<TextureHandle, LoadError>;
    /// Makes `handle` the texture behind `unit`.
    fn bind(&mut self, unit: u32, handle: TextureHandle);
    /// Frees the texture object. The handle is dead afterwards.
    fn release(&mut self, handle: TextureHandle);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureSlot {
    pub tag: String,
    pub handle: TextureHandle,
}

/// Bounded, insertion-ordered registry of scene textures.
///
/// Slot `i` is bound to texture unit `i`. At most [`MAX_TEXTURE_SLOTS`] slots
/// can be live; loads past that are rejected before anything is decoded or
/// uploaded.
#[derive(Debug, Default)]
pub struct TextureTable {
    slots: Vec<TextureSlot>,
    wrap_policy: WrapPolicy,
}

impl TextureTable {
    pub fn new() -> Self {
        Self::with_wrap_policy(WrapPolicy::default())
    }

    pub fn with_wrap_policy(wrap_policy: WrapPolicy) -> Self {
        Self {
            slots: Vec::with_capacity(MAX_TEXTURE_SLOTS),
            wrap_policy,
        }
    }

    /// Decodes `path` and registers it under `tag`.
    ///
    /// A decode or upload failure is logged and returned; the table is left
    /// untouched and stays usable.
    pub fn load<B: TextureBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        path: impl AsRef<Path>,
        tag: &str,
    ) -> Result<TextureHandle, LoadError> {
        let path = path.as_ref();
        self.check_insert(tag)?;
        let image = DecodedImage::open(path).inspect_err(|e| log::warn!("{e}"))?;
        log::debug!(
            "Decoded {} ({}x{}, {} channels) for `{tag}`",
            path.display(),
            image.width,
            image.height,
            image.channels
        );
        self.insert(backend, &image, tag)
    }

    /// Registers already decoded pixels under `tag`.
    pub fn load_image<B: TextureBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        image: &DecodedImage,
        tag: &str,
    ) -> Result<TextureHandle, LoadError> {
        self.check_insert(tag)?;
        self.insert(backend, image, tag)
    }

    fn check_insert(&self, tag: &str) -> Result<(), LoadError> {
        if self.slots.len() >= MAX_TEXTURE_SLOTS {
            return Err(LoadError::Capacity {
                tag: tag.to_string(),
                capacity: MAX_TEXTURE_SLOTS,
            });
        }
        if self.find_handle(tag).is_some() {
            return Err(LoadError::DuplicateTag(tag.to_string()));
        }
        Ok(())
    }

    fn insert<B: TextureBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        image: &DecodedImage,
        tag: &str,
    ) -> Result<TextureHandle, LoadError> {
        let wrap = self.wrap_policy.mode_for(tag);
        let handle = backend
            .upload(image, tag, wrap)
            .inspect_err(|e| log::warn!("{e}"))?;
        self.slots.push(TextureSlot {
            tag: tag.to_string(),
            handle,
        });
        Ok(handle)
    }

    /// Binds slot `i` to texture unit `i` for every registered slot.
    pub fn bind_all<B: TextureBackend + ?Sized>(&self, backend: &mut B) {
        for (unit, slot) in self.slots.iter().enumerate() {
            backend.bind(unit as u32, slot.handle);
        }
        log::info!("Bound {} textures", self.slots.len());
    }

    pub fn find_handle(&self, tag: &str) -> Option<TextureHandle> {
        self.slots.iter().find(|s| s.tag == tag).map(|s| s.handle)
    }

    pub fn find_unit(&self, tag: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.tag == tag)
    }

    /// [`find_unit`](Self::find_unit) flattened to the shader's sampler value,
    /// [`NOT_FOUND`] on a miss.
    pub fn unit_or_sentinel(&self, tag: &str) -> i32 {
        self.find_unit(tag).map_or(NOT_FOUND, |unit| unit as i32)
    }

    /// Frees every texture and empties the table. Safe to call repeatedly.
    pub fn release_all<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.slots.is_empty() {
            return;
        }
        let released = self.slots.len();
        for slot in self.slots.drain(..) {
            backend.release(slot.handle);
        }
        log::info!("Released {released} textures");
    }

    pub fn slots(&self) -> &[TextureSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn wrap_policy(&self) -> &WrapPolicy {
        &self.wrap_policy
    }
}
