//! Per-draw shader state as a value.
//!
//! The shader sink is write-through and remembers whatever was written last, so
//! two rules decide what a draw actually sees:
//!
//! - colour and texture are mutually exclusive, the later one wins: setting a
//!   colour drops a texture set earlier;
//! - a field left unset (or a material tag that does not resolve) leaves the
//!   previous draw's value in place.
//!
//! [`DrawState`] makes both rules explicit. Its builder methods and
//! [`DrawState::merge`] apply them, and
//! [`ShaderState::apply`](crate::pipelines::shader_state::ShaderState::apply)
//! turns the result into uniform writes.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawState {
    color: Option<[f32; 4]>,
    texture: Option<String>,
    material: Option<String>,
    uv_scale: Option<[f32; 2]>,
}

impl DrawState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat colour. Clears any texture set before it.
    pub fn with_color(mut self, r: f32, g: f32, b: f32, a: f32) -> Self {
        self.color = Some([r, g, b, a]);
        self.texture = None;
        self
    }

    /// Textured draw. A colour set before it is kept (its alpha still applies).
    pub fn with_texture(mut self, tag: impl Into<String>) -> Self {
        self.texture = Some(tag.into());
        self
    }

    pub fn with_material(mut self, tag: impl Into<String>) -> Self {
        self.material = Some(tag.into());
        self
    }

    pub fn with_uv_scale(mut self, u: f32, v: f32) -> Self {
        self.uv_scale = Some([u, v]);
        self
    }

    /// Layers `later` on top of `self`.
    ///
    /// Fields set in `later` override. A colour in `later` without a texture
    /// clears the texture from `self`, the same as calling
    /// [`with_color`](Self::with_color) after [`with_texture`](Self::with_texture).
    pub fn merge(&self, later: &DrawState) -> DrawState {
        let texture = match (&later.texture, later.color) {
            (Some(tag), _) => Some(tag.clone()),
            (None, Some(_)) => None,
            (None, None) => self.texture.clone(),
        };
        DrawState {
            color: later.color.or(self.color),
            texture,
            material: later.material.clone().or_else(|| self.material.clone()),
            uv_scale: later.uv_scale.or(self.uv_scale),
        }
    }

    pub fn color(&self) -> Option<[f32; 4]> {
        self.color
    }

    pub fn texture(&self) -> Option<&str> {
        self.texture.as_deref()
    }

    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    pub fn uv_scale(&self) -> Option<[f32; 2]> {
        self.uv_scale
    }

    /// Whether the draw will sample a texture once this state is applied on
    /// top of `previous_uses_texture`.
    pub fn uses_texture(&self, previous_uses_texture: bool) -> bool {
        match (&self.texture, self.color) {
            (Some(_), _) => true,
            (None, Some(_)) => false,
            (None, None) => previous_uses_texture,
        }
    }
}
