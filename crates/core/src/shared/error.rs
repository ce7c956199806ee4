use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by the detector and predictor capabilities.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum LandmarkError {
    #[error("a landmarks model file is not set")]
    Configuration,

    #[error("{0} is not available: persistence support is not compiled in")]
    UnsupportedOperation(&'static str),

    #[error("failed to load landmarks model from {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("frame scale must be finite and > 0, got {0}")]
    InvalidScale(f32),

    #[error("face detection failed: {0}")]
    Detection(#[source] BoxError),

    #[error("landmark prediction failed: {0}")]
    Prediction(#[source] BoxError),

    #[error("malformed sequence payload: {0}")]
    MalformedSequence(String),

    #[error("sequence format version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = LandmarkError> = std::result::Result<T, E>;
