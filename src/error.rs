//! Error types for the compositor

use thiserror::Error;

/// Result type alias for compositor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a rendered DOM into SVG
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The DOM could not resolve a computed style for a node.
    ///
    /// Style lookups are best-effort: the compositor recovers from this by
    /// using an empty style map, so it never escapes a trace.
    #[error("Computed style unavailable: {0}")]
    UnresolvableStyle(String),

    /// A style length used a unit other than `px` or `em`
    #[error("Unsupported length unit in {value:?}")]
    UnsupportedLengthUnit { value: String },

    /// An expected child node was missing
    #[error("Unexpected document structure: {0}")]
    StructuralMismatch(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Markup or request payload could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A render task failed outside the compositor itself
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ParseError(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::ConfigError(format!("document URL: {}", err))
    }
}
