//! Scene lifecycle.
//!
//! [`SceneManager`] owns the three registries for the lifetime of one scene:
//! prepare once, render any number of frames, tear down once. It is not `Sync`
//! in spirit; every call assumes exclusive access to the GPU backend.

use crate::{
    data_structures::{
        light::LightRegistry,
        material::MaterialRegistry,
    },
    pipelines::uniforms::UniformSink,
    render::{BlendControl, MeshDraw, SceneEntry, render_entries},
    resources::{
        manifest::{ManifestError, SceneManifest},
        texture::{DecodedImage, LoadError, TextureBackend, TextureHandle, TextureTable},
    },
};

/// What [`SceneManager::prepare_scene`] managed to load.
#[derive(Debug, Default)]
pub struct PrepareSummary {
    pub loaded: Vec<String>,
    pub failed: Vec<(String, LoadError)>,
}

pub struct SceneManager<B: TextureBackend> {
    backend: B,
    textures: TextureTable,
    materials: MaterialRegistry,
    lights: LightRegistry,
}

impl<B: TextureBackend> SceneManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            textures: TextureTable::new(),
            materials: MaterialRegistry::new(),
            lights: LightRegistry::new(),
        }
    }

    /// Loads every texture of `manifest`, binds them, defines its materials
    /// and pushes its lights into `sink`.
    ///
    /// An invalid manifest is rejected before any state changes. Textures that
    /// fail to load are skipped and reported in the summary; the scene still
    /// renders without them. Preparing again releases what the previous
    /// preparation loaded.
    pub fn prepare_scene<S: UniformSink + ?Sized>(
        &mut self,
        manifest: &SceneManifest,
        sink: &mut S,
    ) -> Result<PrepareSummary, ManifestError> {
        manifest.validate()?;
        self.textures.release_all(&mut self.backend);
        self.textures = TextureTable::with_wrap_policy(manifest.wrap_policy());

        let mut summary = PrepareSummary::default();
        for source in &manifest.textures {
            let path = manifest.texture_path(source);
            match self.textures.load(&mut self.backend, &path, &source.tag) {
                Ok(_) => summary.loaded.push(source.tag.clone()),
                Err(e) => summary.failed.push((source.tag.clone(), e)),
            }
        }
        self.textures.bind_all(&mut self.backend);

        self.materials = manifest.material_registry();
        self.lights.configure(manifest.lights.clone(), sink)?;

        log::info!(
            "Scene prepared: {} textures, {} failed, {} materials",
            summary.loaded.len(),
            summary.failed.len(),
            self.materials.len()
        );
        Ok(summary)
    }

    /// Registers already decoded pixels after preparation and rebinds every
    /// unit.
    pub fn add_texture_image(
        &mut self,
        image: &DecodedImage,
        tag: &str,
    ) -> Result<TextureHandle, LoadError> {
        let handle = self.textures.load_image(&mut self.backend, image, tag)?;
        self.textures.bind_all(&mut self.backend);
        Ok(handle)
    }

    /// Draws `entries` in order into `target`.
    pub fn render_scene<T>(&self, entries: &[SceneEntry], target: &mut T)
    where
        T: UniformSink + MeshDraw + BlendControl,
    {
        render_entries(entries, &self.textures, &self.materials, target);
    }

    /// Frees every texture. Runs again from `Drop`, where it is a no-op.
    pub fn teardown(&mut self) {
        self.textures.release_all(&mut self.backend);
    }

    pub fn textures(&self) -> &TextureTable {
        &self.textures
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn lights(&self) -> &LightRegistry {
        &self.lights
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: TextureBackend> Drop for SceneManager<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
