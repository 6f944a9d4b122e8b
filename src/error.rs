//! Error types for markstream library.

use thiserror::Error;

/// Result type alias for markstream operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while parsing, rendering or opening links.
#[derive(Error, Debug)]
pub enum Error {
    /// The parser rejected the input text.
    #[error("Markdown parsing error: {0}")]
    Parse(String),

    /// A document tree, theme or timeline could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The link-opening facility failed to open a target.
    #[error("Failed to open link {href}: {reason}")]
    LinkOpen {
        /// The target that was passed to the opener
        href: String,
        /// Why the opener refused or failed
        reason: String,
    },

    /// Error during rendering (view tree export).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a parse error from anything displayable.
    pub fn parse(message: impl std::fmt::Display) -> Self {
        Error::Parse(message.to_string())
    }

    /// Create a link-open error for `href`.
    pub fn link_open(href: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::LinkOpen {
            href: href.into(),
            reason: reason.to_string(),
        }
    }
}
