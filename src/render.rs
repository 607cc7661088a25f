//! Frame sequencing.
//!
//! A frame is a flat, ordered list of [`SceneEntry`] values. For every entry the
//! sequencer pushes the transform and draw state through
//! [`ShaderState`](crate::pipelines::shader_state::ShaderState) and then asks the
//! mesh provider to draw one primitive. Entries do not own each other and are
//! not reordered.
//!
//! # Key types
//!
//! - [`MeshKind`] names the primitive shape an entry draws
//! - [`SceneEntry`] is one (transform, state, mesh) triple
//! - [`MeshDraw`] and [`BlendControl`] are the draw-side collaborators
//!

use serde::{Deserialize, Serialize};

use crate::{
    data_structures::{draw_state::DrawState, material::MaterialRegistry, transform::Transform},
    pipelines::{shader_state::ShaderState, uniforms::UniformSink},
    resources::texture::TextureTable,
};

/// Primitive meshes the geometry provider knows how to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MeshKind {
    Box,
    Plane,
    Cylinder {
        #[serde(default = "yes")]
        top: bool,
        #[serde(default = "yes")]
        bottom: bool,
    },
    Cone,
    Sphere,
    HalfSphere,
    Torus,
    HalfTorus,
    Prism,
    Pyramid,
    TaperedCylinder,
}

fn yes() -> bool {
    true
}

impl MeshKind {
    /// Closed cylinder, both caps drawn.
    pub const CYLINDER: MeshKind = MeshKind::Cylinder {
        top: true,
        bottom: true,
    };
}

/// Draws one primitive with whatever shader state is current.
pub trait MeshDraw {
    fn draw_mesh(&mut self, mesh: MeshKind);
}

/// Alpha blending switch. The sequencer toggles it around translucent entries
/// only; nothing else tracks it.
pub trait BlendControl {
    fn set_blending(&mut self, enabled: bool);
}

/// One object of the frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    pub mesh: MeshKind,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub state: DrawState,
    /// Drawn with alpha blending (glass and the like).
    #[serde(default)]
    pub translucent: bool,
}

impl SceneEntry {
    pub fn new(mesh: MeshKind, transform: Transform, state: DrawState) -> Self {
        Self {
            mesh,
            transform,
            state,
            translucent: false,
        }
    }

    pub fn translucent(mut self) -> Self {
        self.translucent = true;
        self
    }
}

/// Pushes state for and draws every entry, in order.
///
/// Blending is switched on immediately before each translucent entry and off
/// immediately after it.
pub fn render_entries<T>(
    entries: &[SceneEntry],
    textures: &TextureTable,
    materials: &MaterialRegistry,
    target: &mut T,
) where
    T: UniformSink + MeshDraw + BlendControl,
{
    for entry in entries {
        {
            let mut state = ShaderState::new(&mut *target, textures, materials);
            state.set_transform(&entry.transform);
            state.apply(&entry.state);
        }
        if entry.translucent {
            target.set_blending(true);
            target.draw_mesh(entry.mesh);
            target.set_blending(false);
        } else {
            target.draw_mesh(entry.mesh);
        }
    }
}
