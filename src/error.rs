//! Crate-level error types.

use std::fmt;

use crate::picking::PickError;

/// Errors produced while loading geometry or running picks.
#[derive(Debug)]
pub enum Error {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Malformed scene description.
    Scene(serde_json::Error),
    /// Malformed STL data.
    Stl(String),
    /// Pick aborted.
    Pick(PickError),
    /// Failed to encode a pick map.
    Image(image::ImageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Scene(e) => write!(f, "scene parse error: {e}"),
            Self::Stl(msg) => write!(f, "STL parse error: {msg}"),
            Self::Pick(e) => write!(f, "pick failed: {e}"),
            Self::Image(e) => write!(f, "image error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Scene(e) => Some(e),
            Self::Pick(e) => Some(e),
            Self::Image(e) => Some(e),
            Self::Stl(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Scene(e)
    }
}

impl From<PickError> for Error {
    fn from(e: PickError) -> Self {
        Self::Pick(e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}
