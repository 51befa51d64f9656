//! Error types for the viewer
//!
//! Each layer has its own `thiserror` enum; `ViewerError` is what escapes to
//! the HTTP surface and the top-level failure page.

use thiserror::Error;

/// Failures talking to a content backend (filesystem, Etherpad, content API)
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Etherpad API error {code}: {message}")]
    Etherpad { code: i64, message: String },

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Unexpected response: {0}")]
    Response(String),
}

/// Failures while rewriting document text
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Invalid frontmatter: {0}")]
    Frontmatter(#[from] serde_yaml::Error),

    #[error("Frontmatter must be a mapping, found a {0}")]
    NotAMapping(&'static str),
}

/// Errors surfaced by the viewer to its callers
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Invalid view path: {0}")]
    InvalidPath(String),

    #[error("Unknown source '{0}', expected 'file' or 'pad'")]
    UnknownSource(String),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Presentation error: {0}")]
    Presentation(String),
}

pub type Result<T, E = ViewerError> = std::result::Result<T, E>;
