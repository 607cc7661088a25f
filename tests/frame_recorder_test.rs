use approx::assert_relative_eq;
use scene_ngin::{
    DrawState, LightRegistry, MaterialRegistry, MeshKind, SceneEntry, TextureTable, Transform,
    UniformSink,
    cgmath::{Matrix4, SquareMatrix, Vector3, Vector4},
    data_structures::light::default_lights,
    frame::{FrameRecorder, ObjectUniform},
    render::render_entries,
    resources::texture::DecodedImage,
};

use crate::common::test_utils::RecordingBackend;

mod common;

fn textures(tags: &[&str]) -> TextureTable {
    let mut backend = RecordingBackend::new();
    let mut table = TextureTable::new();
    let image = DecodedImage::solid(1, 1, [255; 4]);
    for tag in tags {
        table.load_image(&mut backend, &image, tag).unwrap();
    }
    table.bind_all(&mut backend);
    table
}

#[test]
fn every_draw_snapshots_the_current_state() {
    let textures = textures(&["wood1", "panda"]);
    let materials = MaterialRegistry::with_defaults();
    let mut recorder = FrameRecorder::new();
    let entries = vec![
        SceneEntry::new(
            MeshKind::Cylinder {
                top: false,
                bottom: false,
            },
            Transform::new().with_position(9.0, 6.8, -4.0),
            DrawState::new()
                .with_color(1.0, 1.0, 1.0, 1.0)
                .with_texture("panda")
                .with_uv_scale(3.0, 1.0)
                .with_material("silicone"),
        ),
        SceneEntry::new(
            MeshKind::Sphere,
            Transform::new(),
            DrawState::new().with_color(0.0, 0.0, 0.0, 1.0),
        ),
    ];

    recorder.begin_frame();
    render_entries(&entries, &textures, &materials, &mut recorder);

    let commands = recorder.commands();
    assert_eq!(commands.len(), 2);

    let head = &commands[0].object;
    assert_eq!(head.use_texture, 1);
    assert_eq!(head.texture_unit, 1);
    assert_eq!(head.uv_scale, [3.0, 1.0]);
    assert_eq!(head.diffuse_color, [0.9, 0.9, 0.9]);
    assert_relative_eq!(head.shininess, 2.0);
    assert_eq!(head.model[3], [9.0, 6.8, -4.0, 1.0]);

    let ear = &commands[1].object;
    assert_eq!(ear.use_texture, 0);
    assert_eq!(ear.color, [0.0, 0.0, 0.0, 1.0]);
    // carried over from the previous entry
    assert_eq!(ear.uv_scale, [3.0, 1.0]);
    assert_eq!(ear.diffuse_color, [0.9, 0.9, 0.9]);
    assert_eq!(ear.model, Into::<[[f32; 4]; 4]>::into(Matrix4::<f32>::identity()));
}

#[test]
fn translucent_entries_are_marked_blended() {
    let textures = textures(&[]);
    let materials = MaterialRegistry::new();
    let mut recorder = FrameRecorder::new();
    let entries = vec![
        SceneEntry::new(MeshKind::Plane, Transform::new(), DrawState::new()),
        SceneEntry::new(MeshKind::Plane, Transform::new(), DrawState::new()).translucent(),
        SceneEntry::new(MeshKind::Box, Transform::new(), DrawState::new()),
    ];

    render_entries(&entries, &textures, &materials, &mut recorder);

    let blended: Vec<bool> = recorder.commands().iter().map(|c| c.blended).collect();
    assert_eq!(blended, vec![false, true, false]);
    assert!(!recorder.blending());
}

#[test]
fn lights_land_in_the_frame_block() {
    let mut recorder = FrameRecorder::new();
    LightRegistry::new()
        .configure(default_lights(), &mut recorder)
        .unwrap();

    assert_eq!(recorder.current().use_lighting, 1);
    let lights = recorder.lights();
    assert_eq!(lights[0].position, [-110.0, 50.0, 20.0]);
    assert_eq!(lights[0].enabled, 1);
    assert_relative_eq!(lights[1].constant, 0.5);
    assert_relative_eq!(lights[2].quadratic, 0.002);
    assert_eq!(lights[3].enabled, 0);
}

#[test]
fn normal_matrix_undoes_non_uniform_scale() {
    let mut recorder = FrameRecorder::new();
    let model = Matrix4::from_nonuniform_scale(2.0, 4.0, 1.0);
    recorder.set_mat4("model", model);

    let normal = Matrix4::from(recorder.current().normal);
    let n = normal * Vector4::new(0.0, 1.0, 0.0, 0.0);
    assert_relative_eq!(n.y, 0.25);

    // singular matrices fall back to the model matrix itself
    let flat = Matrix4::from_nonuniform_scale(1.0, 0.0, 1.0);
    recorder.set_mat4("model", flat);
    assert_eq!(Matrix4::from(recorder.current().normal), flat);
}

#[test]
fn mistyped_and_unknown_uniforms_are_ignored() {
    let mut recorder = FrameRecorder::new();
    let before = *recorder.current();

    recorder.set_vec3("model", Vector3::new(1.0, 2.0, 3.0));
    recorder.set_float("objectColor", 0.5);
    recorder.set_bool("bUseShadows", true);
    recorder.set_vec3("pointLights[7].position", Vector3::new(1.0, 1.0, 1.0));
    recorder.set_int("objectTexture", 3);

    assert_eq!(*recorder.current(), before);
    assert_eq!(before, ObjectUniform::default());
}

#[test]
fn begin_frame_keeps_state_but_drops_draws() {
    let textures = textures(&[]);
    let materials = MaterialRegistry::with_defaults();
    let mut recorder = FrameRecorder::new();
    let entries = vec![SceneEntry::new(
        MeshKind::Box,
        Transform::new(),
        DrawState::new().with_material("rug"),
    )];

    render_entries(&entries, &textures, &materials, &mut recorder);
    recorder.begin_frame();

    assert!(recorder.commands().is_empty());
    assert_relative_eq!(recorder.current().shininess, 1.0);
    assert_eq!(recorder.current().diffuse_color, [0.65, 0.45, 0.3]);
}
