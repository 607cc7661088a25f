//! scene-ngin
//!
//! The render-pass core of a small 3D scene: a bounded texture table, material
//! and light registries, the transform and shader-state pipeline that turns a
//! draw description into named uniform writes, and a sequencer that walks an
//! ordered list of scene entries. A wgpu backend records those writes per draw
//! and replays them into a render pass.
//!
//! High-level modules
//! - `context`: headless GPU device/queue, offscreen target and render knobs
//! - `data_structures`: transforms, materials, lights, draw state, GPU textures
//! - `frame`: records uniform writes and draws, replays them on wgpu
//! - `pipelines`: the uniform protocol, shader-state writes, the scene pipelines
//! - `resources`: texture table, scene manifests and primitive meshes
//! - `render`: the frame sequencer
//! - `scene`: prepare/render/teardown lifecycle
//!

pub mod context;
pub mod data_structures;
pub mod frame;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use data_structures::{
    draw_state::DrawState,
    light::{Attenuation, LightRegistry, PointLight},
    material::{Material, MaterialRegistry},
    transform::{Transform, compose_model_matrix},
};
pub use pipelines::{shader_state::ShaderState, uniforms::UniformSink};
pub use render::{MeshKind, SceneEntry};
pub use resources::{
    manifest::SceneManifest,
    texture::{LoadError, TextureBackend, TextureTable},
};
pub use scene::SceneManager;
