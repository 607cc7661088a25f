//! Renders a scene manifest offscreen and writes the result as a PNG.
//!
//! ```text
//! desk-scene [manifest.toml] [output.png]
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use scene_ngin::{
    SceneManager, SceneManifest,
    cgmath::{Deg, Point3},
    context::{GpuContext, OffscreenTarget},
    data_structures::texture::GpuTextures,
    frame::{FrameRecorder, FrameTargets, View},
    pipelines::scene::ScenePipelines,
    resources::mesh::PrimitiveMeshes,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let manifest_path = args.next().map(PathBuf::from).unwrap_or_else(|| {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/desk/desk.toml"))
    });
    let output = args.next().map_or_else(|| PathBuf::from("desk.png"), PathBuf::from);

    let manifest = SceneManifest::load(&manifest_path)?;
    futures::executor::block_on(run(&manifest, output))
}

async fn run(manifest: &SceneManifest, output: PathBuf) -> anyhow::Result<()> {
    let gpu = GpuContext::headless().await?;
    let (width, height) = (manifest.render.width, manifest.render.height);
    let target = OffscreenTarget::new(&gpu.device, width, height);
    let pipelines = ScenePipelines::new(&gpu.device, OffscreenTarget::FORMAT);
    let meshes = PrimitiveMeshes::new(&gpu.device);

    let mut recorder = FrameRecorder::new();
    let mut scene = SceneManager::new(GpuTextures::new(&gpu.device, &gpu.queue));
    let summary = scene
        .prepare_scene(manifest, &mut recorder)
        .context("Scene preparation failed")?;
    for (tag, error) in &summary.failed {
        log::warn!("`{tag}` will render untextured: {error}");
    }

    recorder.begin_frame();
    scene.render_scene(&manifest.entries, &mut recorder);

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

    let image = target.read_pixels(&gpu).await?;
    image
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!("Wrote {}", output.display());

    scene.teardown();
    Ok(())
}
