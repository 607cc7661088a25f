//! Scene content as data.
//!
//! A manifest lists the textures to load, the materials and lights to define
//! and the ordered frame entries. Anything left out falls back to the desk
//! scene defaults.
//!
//! ```toml
//! asset_root = "textures"
//!
//! [[textures]]
//! path = "rustic_wood.jpg"
//! tag = "wood1"
//!
//! [[entries]]
//! mesh = { kind = "box" }
//! transform = { scale = [20.0, 1.0, 10.0], position = [0.0, 5.0, 0.0] }
//! state = { texture = "wood1", material = "wood", uv_scale = [2.0, 1.0] }
//! ```

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    context::RenderConfig,
    data_structures::{
        light::{LightError, PointLight, default_lights},
        material::{Material, MaterialRegistry, default_materials},
    },
    pipelines::uniforms::MAX_POINT_LIGHTS,
    render::SceneEntry,
    resources::texture::{MAX_TEXTURE_SLOTS, WrapPolicy},
};

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read scene manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scene manifest: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("scene manifest lists {count} textures, at most {max} fit")]
    TooManyTextures { count: usize, max: usize },
    #[error("texture tag `{0}` is listed twice")]
    DuplicateTexture(String),
    #[error(transparent)]
    Lights(#[from] LightError),
}

/// One image file to register under `tag`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureSource {
    pub path: PathBuf,
    pub tag: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneManifest {
    /// Texture paths are relative to this directory.
    #[serde(default)]
    pub asset_root: PathBuf,
    #[serde(default)]
    pub textures: Vec<TextureSource>,
    /// Tags sampled with clamp-to-edge instead of repeat.
    #[serde(default = "default_clamp_tags")]
    pub clamp_tags: Vec<String>,
    #[serde(default = "default_materials")]
    pub materials: Vec<Material>,
    #[serde(default = "default_lights")]
    pub lights: Vec<PointLight>,
    #[serde(default)]
    pub entries: Vec<SceneEntry>,
    #[serde(default)]
    pub render: RenderConfig,
}

fn default_clamp_tags() -> Vec<String> {
    vec!["panda".to_string(), "thinkpad".to_string()]
}

impl Default for SceneManifest {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::new(),
            textures: Vec::new(),
            clamp_tags: default_clamp_tags(),
            materials: default_materials(),
            lights: default_lights(),
            entries: Vec::new(),
            render: RenderConfig::default(),
        }
    }
}

impl SceneManifest {
    pub fn from_toml_str(source: &str) -> Result<Self, ManifestError> {
        let manifest: Self = toml::from_str(source)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reads a manifest file. A relative `asset_root` is resolved against the
    /// directory the file lives in.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = Self::from_toml_str(&source)?;
        if manifest.asset_root.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            manifest.asset_root = base.join(&manifest.asset_root);
        }
        log::info!(
            "Loaded scene manifest {} ({} textures, {} entries)",
            path.display(),
            manifest.textures.len(),
            manifest.entries.len()
        );
        Ok(manifest)
    }

    /// Rejects content that could never be prepared as a whole.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.textures.len() > MAX_TEXTURE_SLOTS {
            return Err(ManifestError::TooManyTextures {
                count: self.textures.len(),
                max: MAX_TEXTURE_SLOTS,
            });
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.textures.iter().find(|t| !seen.insert(t.tag.as_str())) {
            return Err(ManifestError::DuplicateTexture(dup.tag.clone()));
        }
        if self.lights.len() > MAX_POINT_LIGHTS {
            return Err(LightError::TooMany {
                count: self.lights.len(),
                max: MAX_POINT_LIGHTS,
            }
            .into());
        }
        if let Some(light) = self.lights.iter().find(|l| l.index >= MAX_POINT_LIGHTS) {
            return Err(LightError::IndexOutOfRange {
                index: light.index,
                max: MAX_POINT_LIGHTS,
            }
            .into());
        }
        Ok(())
    }

    pub fn texture_path(&self, source: &TextureSource) -> PathBuf {
        self.asset_root.join(&source.path)
    }

    pub fn wrap_policy(&self) -> WrapPolicy {
        WrapPolicy::new(self.clamp_tags.iter().cloned())
    }

    pub fn material_registry(&self) -> MaterialRegistry {
        let mut registry = MaterialRegistry::new();
        for material in &self.materials {
            registry.register(material.clone());
        }
        registry
    }
}
