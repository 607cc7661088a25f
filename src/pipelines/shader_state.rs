//! Per-draw shader state writes.
//!
//! [`ShaderState`] is a thin write-through layer over a [`UniformSink`]: each
//! setter turns its arguments into one or more uniform writes and keeps nothing
//! for itself. Callers set the transform first, then colour/texture/material/UV,
//! then issue the draw. Nothing is validated between calls.

use cgmath::{Vector2, Vector3, Vector4};

use crate::{
    data_structures::{
        draw_state::DrawState,
        material::MaterialRegistry,
        transform::{Transform, compose_model_matrix},
    },
    pipelines::uniforms::{
        MATERIAL_DIFFUSE, MATERIAL_SHININESS, MATERIAL_SPECULAR, MODEL, OBJECT_COLOR,
        OBJECT_TEXTURE, Sampler, USE_TEXTURE, UV_SCALE, UniformSink,
    },
    resources::texture::TextureTable,
};

pub struct ShaderState<'a, S: UniformSink + ?Sized> {
    sink: &'a mut S,
    textures: &'a TextureTable,
    materials: &'a MaterialRegistry,
}

impl<'a, S: UniformSink + ?Sized> ShaderState<'a, S> {
    pub fn new(
        sink: &'a mut S,
        textures: &'a TextureTable,
        materials: &'a MaterialRegistry,
    ) -> Self {
        Self {
            sink,
            textures,
            materials,
        }
    }

    /// Pushes the model matrix for `scale`, `rotation_degrees` (X, Y, Z) and
    /// `position`.
    pub fn set_transformations(
        &mut self,
        scale: Vector3<f32>,
        rotation_degrees: Vector3<f32>,
        position: Vector3<f32>,
    ) {
        MODEL.write(&mut *self.sink, compose_model_matrix(scale, rotation_degrees, position));
    }

    pub fn set_transform(&mut self, transform: &Transform) {
        MODEL.write(&mut *self.sink, transform.to_matrix());
    }

    /// Flat colour for the next draw. Also turns texturing off.
    pub fn set_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        USE_TEXTURE.write(&mut *self.sink, false);
        OBJECT_COLOR.write(&mut *self.sink, Vector4::new(r, g, b, a));
    }

    /// Turns texturing on and points the sampler at the unit bound to `tag`.
    ///
    /// An unknown tag still enables texturing but hands the shader
    /// [`NOT_FOUND`](crate::resources::texture::NOT_FOUND), which it treats as
    /// "no texture".
    pub fn set_texture(&mut self, tag: &str) {
        let unit = self.textures.unit_or_sentinel(tag);
        if unit < 0 {
            log::warn!("Texture `{tag}` is not registered; drawing untextured");
        }
        USE_TEXTURE.write(&mut *self.sink, true);
        OBJECT_TEXTURE.write(&mut *self.sink, Sampler(unit));
    }

    /// Pushes the material registered under `tag`. Returns `false` on a miss.
    ///
    /// A miss writes nothing, so the previous draw's material stays in effect.
    // TODO: decide whether a miss should reset to a neutral material; scenes
    // currently rely on the carry-over.
    pub fn set_material(&mut self, tag: &str) -> bool {
        match self.materials.lookup(tag) {
            Some(material) => {
                MATERIAL_DIFFUSE.write(&mut *self.sink, Vector3::from(material.diffuse_color));
                MATERIAL_SPECULAR.write(&mut *self.sink, Vector3::from(material.specular_color));
                MATERIAL_SHININESS.write(&mut *self.sink, material.shininess);
                true
            }
            None => {
                log::debug!("Material `{tag}` not found; keeping previous material");
                false
            }
        }
    }

    pub fn set_uv_scale(&mut self, u: f32, v: f32) {
        UV_SCALE.write(&mut *self.sink, Vector2::new(u, v));
    }

    /// Writes every field `state` sets. Colour goes before texture, so a state
    /// carrying both ends up textured.
    pub fn apply(&mut self, state: &DrawState) {
        if let Some([r, g, b, a]) = state.color() {
            self.set_color(r, g, b, a);
        }
        if let Some(tag) = state.texture() {
            self.set_texture(tag);
        }
        if let Some(tag) = state.material() {
            self.set_material(tag);
        }
        if let Some([u, v]) = state.uv_scale() {
            self.set_uv_scale(u, v);
        }
    }
}
