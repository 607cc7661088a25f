//! Surface reflectance presets.
//!
//! Materials are registered once while the scene is prepared and never change
//! afterwards. Draws refer to them by tag.

use serde::{Deserialize, Serialize};

/// Diffuse/specular colour and shininess pushed as `material.*` uniforms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub tag: String,
    pub diffuse_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub shininess: f32,
}

impl Material {
    pub fn new(
        tag: impl Into<String>,
        diffuse_color: [f32; 3],
        specular_color: [f32; 3],
        shininess: f32,
    ) -> Self {
        let tag = tag.into();
        let shininess = checked_shininess(&tag, shininess);
        Self {
            tag,
            diffuse_color,
            specular_color,
            shininess,
        }
    }
}

/// Shininess is an exponent and must not be negative. NaN counts as invalid.
fn checked_shininess(tag: &str, shininess: f32) -> f32 {
    if shininess >= 0.0 {
        shininess
    } else {
        log::warn!("Material `{tag}` has invalid shininess {shininess}, using 0.0");
        0.0
    }
}

/// Ordered catalogue of materials.
///
/// Tags are not deduplicated. Lookups return the first match, so whichever
/// material was registered first under a tag wins.
#[derive(Clone, Debug, Default)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalogue the desk scene ships with.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for material in default_materials() {
            registry.register(material);
        }
        registry
    }

    /// Appends `material`. A negative or NaN shininess is replaced with 0.
    pub fn register(&mut self, mut material: Material) {
        material.shininess = checked_shininess(&material.tag, material.shininess);
        if self.lookup(&material.tag).is_some() {
            log::debug!(
                "Material `{}` registered twice; the earlier entry keeps precedence",
                material.tag
            );
        }
        self.materials.push(material);
    }

    pub fn lookup(&self, tag: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

pub fn default_materials() -> Vec<Material> {
    vec![
        Material::new("plastic", [0.6, 0.6, 0.6], [0.8, 0.8, 0.8], 300.0),
        Material::new("hardplastic", [0.1, 0.1, 0.1], [0.5, 0.5, 0.5], 150.0),
        Material::new("wood", [0.55, 0.27, 0.07], [0.1, 0.05, 0.02], 20.0),
        Material::new("silicone", [0.9, 0.9, 0.9], [0.2, 0.2, 0.2], 2.0),
        Material::new("rug", [0.65, 0.45, 0.3], [0.05, 0.05, 0.05], 1.0),
        Material::new("wall", [0.55, 0.55, 0.55], [0.2, 0.2, 0.2], 5.0),
        Material::new("metal", [0.7, 0.7, 0.7], [1.0, 1.0, 1.0], 300.0),
        // Low diffuse keeps the pane see-through; the highlight does the work.
        Material::new("window", [0.1, 0.1, 0.1], [0.9, 0.9, 0.9], 500.0),
    ]
}
