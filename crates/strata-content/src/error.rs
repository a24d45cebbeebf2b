//! Error types for the content pipeline.

use std::fmt;
use std::path::PathBuf;

use strata_core::graphics::{GpuError, LayoutError};

use crate::asset::AssetType;

/// Errors that can occur during content operations.
#[derive(Debug)]
pub enum AssetError {
    /// The requested file was not found, verbatim or under the data root.
    NotFound {
        path: String,
    },

    /// Failed to read or write file data.
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No processor registered for the file extension.
    NoProcessor {
        extension: String,
    },

    /// A binary container failed validation or decoding.
    Corrupt {
        reason: String,
    },

    /// The operation is not available for this processor or asset.
    Unsupported {
        reason: String,
    },

    /// The asset's CPU-side data has already been discarded.
    Purged {
        kind: AssetType,
    },

    /// Creation parameters or decoded data were rejected.
    InvalidData {
        reason: String,
    },

    /// The handle does not refer to a live entry.
    InvalidHandle,

    /// The entry holds a different kind of asset.
    TypeMismatch {
        expected: AssetType,
        actual: AssetType,
    },

    /// Reload was requested for an asset the cache did not create.
    NotManaged,

    /// A nested load required by the asset being imported failed.
    Dependency {
        path: String,
        source: Box<AssetError>,
    },

    /// The file is already being imported further up the load stack.
    Cycle {
        path: String,
    },

    /// A markup document is malformed or has the wrong structure.
    Markup {
        reason: String,
    },

    Layout(LayoutError),

    Gpu(GpuError),
}

impl AssetError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        AssetError::Corrupt {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        AssetError::InvalidData {
            reason: reason.into(),
        }
    }

    pub(crate) fn markup(reason: impl Into<String>) -> Self {
        AssetError::Markup {
            reason: reason.into(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, AssetError::Corrupt { .. })
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NotFound { path } => write!(f, "File not found: {}", path),
            AssetError::IoError { path, source } => {
                write!(f, "IO error on '{}': {}", path.display(), source)
            }
            AssetError::NoProcessor { extension } => {
                write!(f, "No processor registered for extension: .{}", extension)
            }
            AssetError::Corrupt { reason } => write!(f, "Corrupt file: {}", reason),
            AssetError::Unsupported { reason } => write!(f, "Unsupported: {}", reason),
            AssetError::Purged { kind } => write!(f, "{} is purged", kind),
            AssetError::InvalidData { reason } => write!(f, "Invalid data: {}", reason),
            AssetError::InvalidHandle => write!(f, "Invalid asset handle"),
            AssetError::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {}, found {}", expected, actual)
            }
            AssetError::NotManaged => write!(f, "Asset is not managed by the content cache"),
            AssetError::Dependency { path, source } => {
                write!(f, "Unable to load dependency '{}': {}", path, source)
            }
            AssetError::Cycle { path } => write!(f, "Cyclic reference to '{}'", path),
            AssetError::Markup { reason } => write!(f, "Markup error: {}", reason),
            AssetError::Layout(err) => write!(f, "Vertex layout error: {}", err),
            AssetError::Gpu(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::IoError { source, .. } => Some(source),
            AssetError::Dependency { source, .. } => Some(source.as_ref()),
            AssetError::Layout(err) => Some(err),
            AssetError::Gpu(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        AssetError::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<LayoutError> for AssetError {
    fn from(err: LayoutError) -> Self {
        AssetError::Layout(err)
    }
}

impl From<GpuError> for AssetError {
    fn from(err: GpuError) -> Self {
        AssetError::Gpu(err)
    }
}

/// Result type alias for content operations.
pub type AssetResult<T> = Result<T, AssetError>;
