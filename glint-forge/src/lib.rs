//! Offline scene conditioning for cluster-based rendering.
//!
//! The pipeline takes a source scene, rebuilds each primitive's vertex
//! data (synthesizing flat normals and MikkTSpace tangents where the
//! source had none), welds the result back into an indexed mesh and
//! generates a multi-level meshlet hierarchy for continuous LOD
//! rendering. Everything else in the scene (nodes, materials, textures,
//! images, skins, animations, authoring metadata) passes through
//! untouched.

use std::path::Path;

pub mod error;
pub mod processor;
pub mod scene;

pub use error::{ConvertError, SceneError};
pub use scene::{Meshlet, Primitive, Scene, SkinnedVertex, Vertex};

/// Convert one scene file: load, condition every primitive, write the
/// conditioned blob. Geometry anomalies are logged and recovered from;
/// only load and write failures surface here.
pub fn convert(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<(), ConvertError> {
    let input = input.as_ref();
    let output = output.as_ref();

    let mut scene = Scene::load(input).map_err(|source| ConvertError::Load {
        path: input.to_path_buf(),
        source,
    })?;

    log::info!(
        "conditioning {} primitives from {}",
        scene.primitives().count(),
        input.display()
    );
    processor::process_scene(&mut scene);

    scene::blob::write_scene_to_file(&scene, output).map_err(|source| ConvertError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(())
}
