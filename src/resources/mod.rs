/**
 * This module contains all logic for loading scene content from external files
 * (texture images and scene manifests) and for building primitive meshes.
 */
pub mod manifest;
pub mod mesh;
pub mod texture;
