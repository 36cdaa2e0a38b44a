use std::path::PathBuf;

use thiserror::Error;

/// Failures inside the scene loader / writer.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("unsupported scene format: {0:?}")]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Gltf(#[from] gltf::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Encoding(#[from] bincode::Error),
    #[error("{0}")]
    MalformedScene(String),
}

/// Top-level outcome of a conversion run. Anything the pipeline can
/// recover from locally (degenerate geometry, failed tangent synthesis)
/// is logged instead of surfacing here.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("could not load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: SceneError,
    },
    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: SceneError,
    },
}
