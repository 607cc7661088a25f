//! Object placement in world space.
//!
//! A [`Transform`] is ephemeral: it is built for a single draw, turned into a
//! model matrix and pushed into the shader. There is no hierarchy, every
//! transform is absolute.

use cgmath::{Deg, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// Scale, per-axis Euler rotation in degrees, and position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub scale: [f32; 3],
    pub rotation_degrees: [f32; 3],
    pub position: [f32; 3],
}

impl Transform {
    /// Identity transform (unit scale, no rotation, at the origin).
    pub fn new() -> Self {
        Self {
            scale: [1.0; 3],
            rotation_degrees: [0.0; 3],
            position: [0.0; 3],
        }
    }

    pub fn with_scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = [x, y, z];
        self
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation_degrees = [x, y, z];
        self
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = [x, y, z];
        self
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        compose_model_matrix(
            self.scale.into(),
            self.rotation_degrees.into(),
            self.position.into(),
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds `T(position) * Rz * Ry * Rx * S(scale)`.
///
/// Read right to left: the mesh is scaled, rotated about X, then Y, then Z, and
/// finally moved into place. Scenes are authored against exactly this order, so
/// it must not change.
pub fn compose_model_matrix(
    scale: Vector3<f32>,
    rotation_degrees: Vector3<f32>,
    position: Vector3<f32>,
) -> Matrix4<f32> {
    let scale = Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z);
    let rotation_x = Matrix4::from_angle_x(Deg(rotation_degrees.x));
    let rotation_y = Matrix4::from_angle_y(Deg(rotation_degrees.y));
    let rotation_z = Matrix4::from_angle_z(Deg(rotation_degrees.z));
    let translation = Matrix4::from_translation(position);

    translation * rotation_z * rotation_y * rotation_x * scale
}
