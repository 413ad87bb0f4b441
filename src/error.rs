//! Error types for document, import and decode operations.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::pixels::DecodeError;

/// Result alias used throughout the crate.
pub type Result<T, E = EditorError> = std::result::Result<T, E>;

/// Per-sprite transforms that the manifest importer cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedFeature {
    /// The packer stored the sprite rotated by 90 degrees.
    Rotated,
    /// The packer trimmed transparent borders from the sprite.
    Trimmed,
}

impl fmt::Display for UnsupportedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedFeature::Rotated => write!(f, "rotated"),
            UnsupportedFeature::Trimmed => write!(f, "trimmed"),
        }
    }
}

/// Errors that can occur while editing, loading, saving or importing.
#[derive(Error, Debug)]
pub enum EditorError {
    /// File read or write failure
    #[error("IO error on {path:?}: {source}")]
    Io {
        /// File that could not be read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Document JSON is structurally invalid or has wrong types
    #[error("Malformed document: {0}")]
    MalformedDocument(#[source] serde_json::Error),

    /// Document bytes are not valid UTF-8 text
    #[error("Malformed document: {0}")]
    MalformedText(String),

    /// Sprite-packer manifest could not be parsed
    #[error("Malformed manifest: {0}")]
    MalformedManifest(#[source] serde_json::Error),

    /// Image bytes could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Manifest entry uses a transform that cannot be imported
    #[error("Sprite '{sprite}' uses unsupported feature: {feature}")]
    UnsupportedFeature {
        /// Name of the offending manifest entry
        sprite: String,
        /// The feature that was encountered
        feature: UnsupportedFeature,
    },

    /// Argument outside the accepted range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation needs a decoded atlas image that is not available
    #[error("Atlas '{atlas}' has no decoded image")]
    ImageUnavailable {
        /// Id of the atlas
        atlas: String,
    },

    /// Keyframe payload does not match the track kind
    #[error("Track kind mismatch: expected {expected}, found {found}")]
    TrackKind {
        /// Kind the operation requires
        expected: &'static str,
        /// Kind of the track that was targeted
        found: &'static str,
    },

    /// Referenced entity does not exist
    #[error("{what} not found: {id}")]
    NotFound {
        /// Kind of thing that was looked up
        what: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Operation needs a document saved on disk
    #[error("Document must be saved before this operation")]
    DocumentPathRequired,
}

impl EditorError {
    /// Create an I/O error for the given path.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an invalid argument error with a message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an unsupported feature error.
    pub fn unsupported(sprite: impl Into<String>, feature: UnsupportedFeature) -> Self {
        Self::UnsupportedFeature {
            sprite: sprite.into(),
            feature,
        }
    }

    /// Create a not found error.
    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            id: id.into(),
        }
    }

    /// Whether the error was raised by a file read or write.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Whether the error means the document text itself is unusable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedDocument(_) | Self::MalformedText(_))
    }
}
