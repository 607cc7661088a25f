pub mod scene;
pub mod shader_state;
pub mod uniforms;
