//! Error type shared by every atlas stage.
//!
//! All caller-input problems (bad tile sizes, negative borders, ragged or
//! empty grids) surface as [`AtlasError::InvalidArgument`]. The remaining
//! variants only come from the file-facing helpers (codec, disk, metadata
//! serialization); the pixel stages themselves never produce them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] ron::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AtlasError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        AtlasError::InvalidArgument(msg.into())
    }

    /// `true` for caller-input errors, which are never worth retrying as-is.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, AtlasError::InvalidArgument(_))
    }
}

pub type Result<T> = std::result::Result<T, AtlasError>;
