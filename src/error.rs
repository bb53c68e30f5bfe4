//! Error types for archive loading, column resolution and sample retrieval.

use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SequenceError>;

/// Errors produced while loading archives, resolving columns and iterating samples.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// The archive path does not exist.
    #[error("archive not found: {}", path.display())]
    ArchiveNotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// The archive exists but could not be decoded.
    #[error("archive {} is corrupt: {reason}", path.display())]
    ArchiveCorrupt {
        /// Path of the archive
        path: PathBuf,
        /// What went wrong while decoding
        reason: String,
    },

    /// A requested feature or depth column is absent from the archive.
    #[error("feature not found in archive: {name}")]
    FeatureNotFound {
        /// Canonical column name that failed to resolve (e.g. `depth_99`)
        name: String,
    },

    /// Sample index outside `[0, len)`.
    #[error("sample index {index} out of range for dataset of {len} sequences")]
    OutOfRange {
        /// Requested index
        index: i64,
        /// Number of samples in the dataset
        len: usize,
    },

    /// Column group counts do not partition the array's feature axis.
    #[error(
        "invalid column layout: {n_depths} depths + {n_dynamic} dynamic + {n_static} static != width {width}"
    )]
    InvalidLayout {
        /// Third-axis length of the array
        width: usize,
        /// Target (depth) column count
        n_depths: usize,
        /// Dynamic feature column count
        n_dynamic: usize,
        /// Static feature column count
        n_static: usize,
    },

    /// Loader or experiment configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Filesystem error while reading or writing configuration.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization failure.
    #[error("failed to parse TOML: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization failure.
    #[error("failed to write TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SequenceError {
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArchiveCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        Self::FeatureNotFound { name: name.into() }
    }
}
