//! Error types for flyer view operations.

use thiserror::Error;

use crate::config::ConfigError;

/// Invalid geometry passed to a conversion or zoom operation.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    /// Scale must be finite and strictly positive
    #[error("Invalid scale {0}: must be finite and greater than zero")]
    InvalidScale(f64),

    /// Rectangle with no area or non-finite components
    #[error("Degenerate rectangle {width}x{height} at ({x}, {y})")]
    DegenerateRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },

    /// A coordinate was NaN or infinite
    #[error("Non-finite coordinate")]
    NonFinite,
}

impl GeometryError {
    /// Create a degenerate rectangle error from its components.
    pub fn degenerate(rect: &crate::geometry::Rect) -> Self {
        Self::DegenerateRect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

/// Failure reported by the content-fetch collaborator.
///
/// Cloneable so it can live in `LoadState::Failed` and still be handed to the
/// delegate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("HTTP status {status}")]
    Http {
        /// The status code returned by the server
        status: u16,
    },

    /// Content could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Content decoded but is unusable (e.g. empty content size)
    #[error("Invalid content: {message}")]
    InvalidContent {
        /// Description of what was wrong with the content
        message: String,
    },

    /// The collaborator dropped its reply without completing it
    #[error("Fetch abandoned before completion")]
    Abandoned,
}

impl FetchError {
    /// Create an invalid content error with a message.
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Errors returned by `FlyerView` operations.
#[derive(Error, Debug)]
pub enum FlyerError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The operation needs content bounds, but no flyer is loaded
    #[error("No flyer content is loaded")]
    NotLoaded,

    /// Page index outside the loaded descriptor's page list
    #[error("Page {index} out of range ({count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
