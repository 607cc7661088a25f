//! Shader uniform protocol.
//!
//! The scene core never touches shader memory directly. Every value it pushes goes
//! through a [`UniformSink`] under a name that the shader program agrees on. Those
//! names are declared here once, each paired with the value type the shader
//! expects, so a mismatched write (say a `vec3` into `model`) fails to compile
//! instead of silently corrupting the draw.
//!
//! # Fixed uniforms
//!
//! | name                     | type      |
//! |--------------------------|-----------|
//! | `model`                  | `mat4`    |
//! | `objectColor`            | `vec4`    |
//! | `objectTexture`          | `sampler` |
//! | `bUseTexture`            | `bool`    |
//! | `bUseLighting`           | `bool`    |
//! | `material.diffuseColor`  | `vec3`    |
//! | `material.specularColor` | `vec3`    |
//! | `material.shininess`     | `float`   |
//! | `UVscale`                | `vec2`    |
//!
//! Point lights live under `pointLights[i].<field>`, see [`PointLightUniforms`].

use std::{borrow::Cow, fmt, marker::PhantomData};

use cgmath::{Matrix4, Vector2, Vector3, Vector4};

/// Number of point lights the shader declares.
pub const MAX_POINT_LIGHTS: usize = 4;

/// Value categories understood by the shader sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Mat4,
    Vec2,
    Vec3,
    Vec4,
    Float,
    Int,
    Bool,
    Sampler,
}

/// A texture unit index written to a sampler uniform. `-1` means "no texture".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sampler(pub i32);

/// Typed setters keyed by uniform name.
///
/// This is the narrow interface to the shader program. Implementations decide
/// where the values end up: a GL program, a CPU-side uniform block that is later
/// copied into a wgpu buffer, or a test double.
pub trait UniformSink {
    fn set_mat4(&mut self, name: &str, value: Matrix4<f32>);
    fn set_vec2(&mut self, name: &str, value: Vector2<f32>);
    fn set_vec3(&mut self, name: &str, value: Vector3<f32>);
    fn set_vec4(&mut self, name: &str, value: Vector4<f32>);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_int(&mut self, name: &str, value: i32);
    fn set_bool(&mut self, name: &str, value: bool);
    fn set_sampler(&mut self, name: &str, unit: i32);
}

/// A Rust type that maps onto exactly one [`UniformKind`].
pub trait UniformValue: Copy {
    const KIND: UniformKind;

    fn write_to<S: UniformSink + ?Sized>(self, sink: &mut S, name: &str);
}

impl UniformValue for Matrix4<f32> {
    const KIND: UniformKind = UniformKind::Mat4;

    fn write_to<S: UniformSink + ?Sized>(self, sink: &mut S, name: &str) {
        sink.set_mat4(name, self);
    }
}

impl UniformValue for Vector2<f32> {
    const KIND: UniformKind = UniformKind::Vec2;

    fn write_to<S: UniformSink + ?Sized>(self, sink: &mut S, name: &str) {
        sink.set_vec2(name, self);
    }
}

impl UniformValue for Vector3<f32> {
    const KIND: UniformKind = UniformKind::Vec3;

    fn write_to<S: UniformSink + ?Sized>(self, sink: &mut S, name: &str) {
        sink.set_vec3(name, self);
    }
}

impl UniformValue for Vector4<f32> {
    const KIND: UniformKind = UniformKind::Vec4;

    fn write_to<S: UniformSink + ?Sized>(self, sink: &mut S, name: &str) {
        sink.set_vec4(name, self);
    }
}

impl UniformValue for f32 {
    const KIND: UniformKind = UniformKind::Float;

    fn write_to<S: UniformSink + ?Sized>(self, sink: &mut S, name: &str) {
        sink.set_float(name, self);
    }
}

impl UniformValue for i32 {
    const KIND: UniformKind = UniformKind::Int;

    fn write_to<S: UniformSink + ?Sized>(self, sink: &mut S, name: &str) {
        sink.set_int(name, self);
    }
}

impl UniformValue for bool {
    const KIND: UniformKind = UniformKind::Bool;

    fn write_to<S: UniformSink + ?Sized>(self, sink: &mut S, name: &str) {
        sink.set_bool(name, self);
    }
}

impl UniformValue for Sampler {
    const KIND: UniformKind = UniformKind::Sampler;

    fn write_to<S: UniformSink + ?Sized>(self, sink: &mut S, name: &str) {
        sink.set_sampler(name, self.0);
    }
}

/// A uniform name bound to the value type the shader declares for it.
pub struct Uniform<T> {
    name: Cow<'static, str>,
    _value: PhantomData<fn(T)>,
}

impl<T: UniformValue> Uniform<T> {
    pub const fn fixed(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _value: PhantomData,
        }
    }

    fn owned(name: String) -> Self {
        Self {
            name: Cow::Owned(name),
            _value: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> UniformKind {
        T::KIND
    }

    pub fn write<S: UniformSink + ?Sized>(&self, sink: &mut S, value: T) {
        value.write_to(sink, &self.name);
    }
}

impl<T> fmt::Debug for Uniform<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Uniform").field(&self.name).finish()
    }
}

pub const MODEL: Uniform<Matrix4<f32>> = Uniform::fixed("model");
pub const OBJECT_COLOR: Uniform<Vector4<f32>> = Uniform::fixed("objectColor");
pub const OBJECT_TEXTURE: Uniform<Sampler> = Uniform::fixed("objectTexture");
pub const USE_TEXTURE: Uniform<bool> = Uniform::fixed("bUseTexture");
pub const USE_LIGHTING: Uniform<bool> = Uniform::fixed("bUseLighting");
pub const MATERIAL_DIFFUSE: Uniform<Vector3<f32>> = Uniform::fixed("material.diffuseColor");
pub const MATERIAL_SPECULAR: Uniform<Vector3<f32>> = Uniform::fixed("material.specularColor");
pub const MATERIAL_SHININESS: Uniform<f32> = Uniform::fixed("material.shininess");
pub const UV_SCALE: Uniform<Vector2<f32>> = Uniform::fixed("UVscale");

/// Every non-indexed uniform of the protocol with its expected kind.
pub const FIXED_UNIFORMS: [(&str, UniformKind); 9] = [
    ("model", UniformKind::Mat4),
    ("objectColor", UniformKind::Vec4),
    ("objectTexture", UniformKind::Sampler),
    ("bUseTexture", UniformKind::Bool),
    ("bUseLighting", UniformKind::Bool),
    ("material.diffuseColor", UniformKind::Vec3),
    ("material.specularColor", UniformKind::Vec3),
    ("material.shininess", UniformKind::Float),
    ("UVscale", UniformKind::Vec2),
];

/// Fields of one `pointLights[i]` entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointLightField {
    Position,
    Ambient,
    Diffuse,
    Specular,
    Active,
    Constant,
    Linear,
    Quadratic,
}

impl PointLightField {
    pub const ALL: [PointLightField; 8] = [
        PointLightField::Position,
        PointLightField::Ambient,
        PointLightField::Diffuse,
        PointLightField::Specular,
        PointLightField::Active,
        PointLightField::Constant,
        PointLightField::Linear,
        PointLightField::Quadratic,
    ];

    pub const fn field_name(self) -> &'static str {
        match self {
            PointLightField::Position => "position",
            PointLightField::Ambient => "ambient",
            PointLightField::Diffuse => "diffuse",
            PointLightField::Specular => "specular",
            PointLightField::Active => "bActive",
            PointLightField::Constant => "constant",
            PointLightField::Linear => "linear",
            PointLightField::Quadratic => "quadratic",
        }
    }

    pub const fn kind(self) -> UniformKind {
        match self {
            PointLightField::Position
            | PointLightField::Ambient
            | PointLightField::Diffuse
            | PointLightField::Specular => UniformKind::Vec3,
            PointLightField::Active => UniformKind::Bool,
            PointLightField::Constant | PointLightField::Linear | PointLightField::Quadratic => {
                UniformKind::Float
            }
        }
    }

    fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.field_name() == name)
    }
}

/// Typed names for every field of `pointLights[index]`.
#[derive(Debug)]
pub struct PointLightUniforms {
    pub position: Uniform<Vector3<f32>>,
    pub ambient: Uniform<Vector3<f32>>,
    pub diffuse: Uniform<Vector3<f32>>,
    pub specular: Uniform<Vector3<f32>>,
    pub active: Uniform<bool>,
    pub constant: Uniform<f32>,
    pub linear: Uniform<f32>,
    pub quadratic: Uniform<f32>,
}

impl PointLightUniforms {
    pub fn new(index: usize) -> Self {
        let name = |field: PointLightField| point_light_name(index, field);
        Self {
            position: Uniform::owned(name(PointLightField::Position)),
            ambient: Uniform::owned(name(PointLightField::Ambient)),
            diffuse: Uniform::owned(name(PointLightField::Diffuse)),
            specular: Uniform::owned(name(PointLightField::Specular)),
            active: Uniform::owned(name(PointLightField::Active)),
            constant: Uniform::owned(name(PointLightField::Constant)),
            linear: Uniform::owned(name(PointLightField::Linear)),
            quadratic: Uniform::owned(name(PointLightField::Quadratic)),
        }
    }
}

pub fn point_light_name(index: usize, field: PointLightField) -> String {
    format!("pointLights[{index}].{}", field.field_name())
}

/// Splits `pointLights[i].<field>` into its index and field.
pub fn parse_point_light_name(name: &str) -> Option<(usize, PointLightField)> {
    let rest = name.strip_prefix("pointLights[")?;
    let (index, field) = rest.split_once("].")?;
    let index: usize = index.parse().ok()?;
    if index >= MAX_POINT_LIGHTS {
        return None;
    }
    Some((index, PointLightField::from_field_name(field)?))
}

/// The kind the protocol expects for `name`, if the name belongs to it at all.
pub fn expected_kind(name: &str) -> Option<UniformKind> {
    FIXED_UNIFORMS
        .iter()
        .find(|(fixed, _)| *fixed == name)
        .map(|(_, kind)| *kind)
        .or_else(|| parse_point_light_name(name).map(|(_, field)| field.kind()))
}
