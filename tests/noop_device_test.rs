use scene_ngin::{
    LoadError, SceneManager, SceneManifest,
    cgmath::{Deg, Point3},
    context::OffscreenTarget,
    data_structures::texture::GpuTextures,
    frame::{FrameRecorder, FrameTargets, View},
    pipelines::scene::ScenePipelines,
    resources::{mesh::PrimitiveMeshes, texture::DecodedImage},
};

use crate::common::test_utils::{init_logger, noop_gpu};

mod common;

#[test]
fn scene_pipelines_build() {
    init_logger();
    let gpu = noop_gpu();

    let pipelines = ScenePipelines::new(&gpu.device, OffscreenTarget::FORMAT);
    let textures = GpuTextures::new(&gpu.device, &gpu.queue);
    let _units = textures.bind_group(&pipelines.texture_layout);
}

#[tokio::test]
async fn desk_frame_submits_and_tears_down() {
    init_logger();
    let gpu = noop_gpu();
    let manifest = SceneManifest::load(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/demos/desk/desk.toml"
    ))
    .unwrap();
    let (width, height) = (manifest.render.width, manifest.render.height);
    let target = OffscreenTarget::new(&gpu.device, width, height);
    let pipelines = ScenePipelines::new(&gpu.device, OffscreenTarget::FORMAT);
    let meshes = PrimitiveMeshes::new(&gpu.device);

    let mut scene = SceneManager::new(GpuTextures::new(&gpu.device, &gpu.queue));
    let mut recorder = FrameRecorder::new();
    scene.prepare_scene(&manifest, &mut recorder).unwrap();
    // The desk images are not shipped; stand in for the table top.
    scene
        .add_texture_image(&DecodedImage::solid(4, 4, [200, 180, 160, 255]), "rusticwood")
        .unwrap();

    recorder.begin_frame();
    scene.render_scene(&manifest.entries, &mut recorder);
    assert_eq!(recorder.commands().len(), manifest.entries.len());

    let texture_units = scene.backend().bind_group(&pipelines.texture_layout);
    let view = View::look_at(
        Point3::new(0.0, 30.0, 45.0),
        Point3::new(0.0, 5.0, 0.0),
        width as f32 / height as f32,
        Deg(45.0),
    );
    recorder.submit(
        &gpu,
        &pipelines,
        &texture_units,
        &meshes,
        &view,
        FrameTargets {
            color: &target.color_view,
            depth: &target.depth.view,
            clear_colour: manifest.render.clear_colour(),
        },
    );

    let image = target.read_pixels(&gpu).await.unwrap();
    assert_eq!(image.dimensions(), (width, height));

    scene.teardown();
    assert_eq!(scene.backend().live(), 0);
}

#[test]
fn texture_larger_than_the_device_allows_is_refused() {
    init_logger();
    let gpu = noop_gpu();
    let max = gpu.device.limits().max_texture_dimension_2d;
    let mut scene = SceneManager::new(GpuTextures::new(&gpu.device, &gpu.queue));

    let panorama = DecodedImage::solid(max + 1, 1, [0, 0, 0, 255]);
    let err = scene.add_texture_image(&panorama, "panorama").unwrap_err();

    assert!(matches!(&err, LoadError::UploadFailed { tag, .. } if tag == "panorama"));
    assert_eq!(scene.textures().find_unit("panorama"), None);
    assert_eq!(scene.backend().live(), 0);

    let empty = DecodedImage::solid(0, 0, [0; 4]);
    assert!(matches!(
        scene.add_texture_image(&empty, "empty"),
        Err(LoadError::UploadFailed { .. })
    ));

    scene
        .add_texture_image(&DecodedImage::solid(2, 2, [0; 4]), "tile")
        .unwrap();
    assert_eq!(scene.textures().find_unit("tile"), Some(0));
    assert_eq!(scene.backend().live(), 1);
}
