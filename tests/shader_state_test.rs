use approx::assert_relative_eq;
use scene_ngin::{
    DrawState, Material, MaterialRegistry, ShaderState, TextureTable, compose_model_matrix,
    cgmath::{Vector2, Vector3, Vector4},
    resources::texture::DecodedImage,
};

use crate::common::test_utils::{RecordingBackend, RecordingSink, Value};

mod common;

fn desk_textures() -> TextureTable {
    let mut backend = RecordingBackend::new();
    let mut table = TextureTable::new();
    let image = DecodedImage::solid(1, 1, [255; 4]);
    table.load_image(&mut backend, &image, "wood1").unwrap();
    table.load_image(&mut backend, &image, "wood2").unwrap();
    table.bind_all(&mut backend);
    table
}

#[test]
fn color_then_texture_ends_textured() {
    let textures = desk_textures();
    let materials = MaterialRegistry::new();
    let mut sink = RecordingSink::new();

    let mut state = ShaderState::new(&mut sink, &textures, &materials);
    state.set_color(1.0, 1.0, 1.0, 1.0);
    state.set_texture("wood2");

    assert_eq!(sink.last_bool("bUseTexture"), Some(true));
    assert_eq!(sink.last_sampler("objectTexture"), Some(1));
}

#[test]
fn texture_then_color_ends_untextured() {
    let textures = desk_textures();
    let materials = MaterialRegistry::new();
    let mut sink = RecordingSink::new();

    let mut state = ShaderState::new(&mut sink, &textures, &materials);
    state.set_texture("wood1");
    state.set_color(0.2, 0.3, 0.4, 0.5);

    assert_eq!(sink.last_bool("bUseTexture"), Some(false));
    assert_eq!(
        sink.last("objectColor"),
        Some(Value::Vec4(Vector4::new(0.2, 0.3, 0.4, 0.5)))
    );
}

#[test]
fn unknown_texture_pushes_sentinel_unit() {
    let textures = desk_textures();
    let materials = MaterialRegistry::new();
    let mut sink = RecordingSink::new();

    ShaderState::new(&mut sink, &textures, &materials).set_texture("missing");

    assert_eq!(sink.last_bool("bUseTexture"), Some(true));
    assert_eq!(sink.last_sampler("objectTexture"), Some(-1));
}

#[test]
fn material_hit_pushes_all_three_fields() {
    let textures = TextureTable::new();
    let materials = MaterialRegistry::with_defaults();
    let mut sink = RecordingSink::new();

    let found = ShaderState::new(&mut sink, &textures, &materials).set_material("wood");

    assert!(found);
    assert_eq!(
        sink.uniforms(),
        vec![
            (
                "material.diffuseColor",
                Value::Vec3(Vector3::new(0.55, 0.27, 0.07))
            ),
            (
                "material.specularColor",
                Value::Vec3(Vector3::new(0.1, 0.05, 0.02))
            ),
            ("material.shininess", Value::Float(20.0)),
        ]
    );
}

#[test]
fn material_miss_keeps_previous_material() {
    let textures = TextureTable::new();
    let materials = MaterialRegistry::with_defaults();
    let mut sink = RecordingSink::new();

    let mut state = ShaderState::new(&mut sink, &textures, &materials);
    assert!(state.set_material("metal"));
    assert!(!state.set_material("velvet"));

    assert_eq!(sink.uniforms().len(), 3);
    assert_eq!(sink.last("material.shininess"), Some(Value::Float(300.0)));
}

#[test]
fn empty_registry_finds_nothing() {
    let registry = MaterialRegistry::new();
    for tag in ["", "wood", "plastic", "window"] {
        assert!(registry.lookup(tag).is_none(), "{tag:?}");
    }
}

#[test]
fn first_registered_material_wins() {
    let mut registry = MaterialRegistry::new();
    registry.register(Material::new("glass", [0.1; 3], [0.9; 3], 500.0));
    registry.register(Material::new("glass", [0.5; 3], [0.5; 3], 1.0));

    assert_eq!(registry.len(), 2);
    let glass = registry.lookup("glass").unwrap();
    assert_relative_eq!(glass.shininess, 500.0);
}

#[test]
fn negative_shininess_is_clamped() {
    let material = Material::new("odd", [1.0; 3], [1.0; 3], -4.0);
    assert_relative_eq!(material.shininess, 0.0);
}

#[test]
fn registry_clamps_shininess_of_struct_literals() {
    let mut registry = MaterialRegistry::new();
    registry.register(Material {
        tag: "negative".to_string(),
        diffuse_color: [1.0; 3],
        specular_color: [1.0; 3],
        shininess: -2.5,
    });
    registry.register(Material {
        tag: "nan".to_string(),
        diffuse_color: [1.0; 3],
        specular_color: [1.0; 3],
        shininess: f32::NAN,
    });

    assert_relative_eq!(registry.lookup("negative").unwrap().shininess, 0.0);
    assert_relative_eq!(registry.lookup("nan").unwrap().shininess, 0.0);
}

#[test]
fn transform_and_uv_scale_are_written_verbatim() {
    let textures = TextureTable::new();
    let materials = MaterialRegistry::new();
    let mut sink = RecordingSink::new();

    let scale = Vector3::new(1.5, 5.0, 1.5);
    let rotation = Vector3::new(0.0, 207.5, 0.0);
    let position = Vector3::new(9.0, 1.5, -4.0);
    let mut state = ShaderState::new(&mut sink, &textures, &materials);
    state.set_transformations(scale, rotation, position);
    state.set_uv_scale(3.0, 1.0);

    assert_eq!(
        sink.last("model"),
        Some(Value::Mat4(compose_model_matrix(scale, rotation, position)))
    );
    assert_eq!(sink.last("UVscale"), Some(Value::Vec2(Vector2::new(3.0, 1.0))));
}

#[test]
fn applying_draw_state_writes_in_fixed_order() {
    let textures = desk_textures();
    let materials = MaterialRegistry::with_defaults();
    let mut sink = RecordingSink::new();

    let draw = DrawState::new()
        .with_color(0.75, 0.75, 0.75, 0.4)
        .with_material("window")
        .with_texture("wood1")
        .with_uv_scale(1.0, 1.0);
    ShaderState::new(&mut sink, &textures, &materials).apply(&draw);

    let names: Vec<&str> = sink.uniforms().into_iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec![
            "bUseTexture",
            "objectColor",
            "bUseTexture",
            "objectTexture",
            "material.diffuseColor",
            "material.specularColor",
            "material.shininess",
            "UVscale",
        ]
    );
    assert_eq!(sink.last_bool("bUseTexture"), Some(true));
}

#[test]
fn merged_states_follow_last_write_wins() {
    let textured = DrawState::new().with_texture("wood1").with_material("wood");
    let coloured = DrawState::new().with_color(1.0, 0.0, 0.0, 1.0);

    let merged = textured.merge(&coloured);
    assert_eq!(merged.texture(), None);
    assert_eq!(merged.material(), Some("wood"));
    assert!(!merged.uses_texture(true));

    let merged = coloured.merge(&textured);
    assert_eq!(merged.texture(), Some("wood1"));
    assert_eq!(merged.color(), Some([1.0, 0.0, 0.0, 1.0]));
    assert!(merged.uses_texture(false));

    let untouched = DrawState::new();
    assert!(untouched.uses_texture(true));
    assert!(!untouched.uses_texture(false));
}
