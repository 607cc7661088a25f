//! Point lights.
//!
//! The shader declares [`MAX_POINT_LIGHTS`] point lights and the global
//! `bUseLighting` switch. [`LightRegistry::configure`] writes all of them in one
//! go while the scene is prepared.

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::pipelines::uniforms::{MAX_POINT_LIGHTS, PointLightUniforms, USE_LIGHTING, UniformSink};

/// Distance falloff `1 / (constant + linear * d + quadratic * d²)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    pub fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            constant,
            linear,
            quadratic,
        }
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    /// Slot in the shader's `pointLights` array.
    pub index: usize,
    pub position: [f32; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub attenuation: Attenuation,
}

impl PointLight {
    fn push<S: UniformSink + ?Sized>(&self, sink: &mut S) {
        let uniforms = PointLightUniforms::new(self.index);
        uniforms.position.write(sink, Vector3::from(self.position));
        uniforms.ambient.write(sink, Vector3::from(self.ambient));
        uniforms.diffuse.write(sink, Vector3::from(self.diffuse));
        uniforms.specular.write(sink, Vector3::from(self.specular));
        uniforms.active.write(sink, self.active);
        uniforms.constant.write(sink, self.attenuation.constant);
        uniforms.linear.write(sink, self.attenuation.linear);
        uniforms.quadratic.write(sink, self.attenuation.quadratic);
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LightError {
    #[error("{count} point lights given, the shader declares {max}")]
    TooMany { count: usize, max: usize },
    #[error("point light index {index} is outside 0..{max}")]
    IndexOutOfRange { index: usize, max: usize },
}

#[derive(Clone, Debug, Default)]
pub struct LightRegistry {
    lights: Vec<PointLight>,
}

impl LightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables lighting and writes every field of every light into `sink`.
    ///
    /// Inactive lights are written too; the shader skips them. The whole set is
    /// rejected before anything is written if it does not fit the shader.
    pub fn configure<S: UniformSink + ?Sized>(
        &mut self,
        lights: Vec<PointLight>,
        sink: &mut S,
    ) -> Result<(), LightError> {
        if lights.len() > MAX_POINT_LIGHTS {
            return Err(LightError::TooMany {
                count: lights.len(),
                max: MAX_POINT_LIGHTS,
            });
        }
        if let Some(light) = lights.iter().find(|l| l.index >= MAX_POINT_LIGHTS) {
            return Err(LightError::IndexOutOfRange {
                index: light.index,
                max: MAX_POINT_LIGHTS,
            });
        }
        self.lights = lights;
        self.push(sink);
        log::info!("Configured {} point lights", self.lights.len());
        Ok(())
    }

    /// Writes the configured lights again, e.g. into a freshly created sink.
    pub fn push<S: UniformSink + ?Sized>(&self, sink: &mut S) {
        USE_LIGHTING.write(sink, true);
        for light in &self.lights {
            light.push(sink);
        }
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }
}

/// Window daylight plus two warm recess lights.
pub fn default_lights() -> Vec<PointLight> {
    let recess = |index: usize, position: [f32; 3]| PointLight {
        index,
        position,
        ambient: [0.105, 0.084, 0.07],
        diffuse: [0.175, 0.14, 0.105],
        specular: [0.105, 0.07, 0.056],
        active: true,
        attenuation: Attenuation::new(0.5, 0.015, 0.002),
    };
    vec![
        PointLight {
            index: 0,
            position: [-110.0, 50.0, 20.0],
            ambient: [0.7, 0.7, 0.7],
            diffuse: [0.4, 0.4, 0.4],
            specular: [0.5, 0.5, 0.5],
            active: true,
            attenuation: Attenuation::new(1.0, 0.013, 0.002),
        },
        recess(1, [30.0, 30.0, 0.0]),
        recess(2, [0.0, 50.0, 0.0]),
    ]
}
