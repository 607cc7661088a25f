//! Scene data structures: textures, transforms, materials, lights and draw state.
//!
//! - `texture` contains the GPU texture wrapper and the wgpu texture backend
//! - `transform` holds scale/rotation/position and the model matrix
//! - `material` is the material catalogue
//! - `light` holds point lights and the light registry
//! - `draw_state` models per-draw colour/texture/material/UV settings

pub mod draw_state;
pub mod light;
pub mod material;
pub mod texture;
pub mod transform;
