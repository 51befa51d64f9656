//! Content backends
//!
//! The refresh loop talks to a `ContentSource`; which one depends on
//! `content.mode` in the config:
//!
//! - [`BackendContentSource`] reads the filesystem and Etherpad directly
//! - [`HttpContentSource`] goes through the JSON endpoints of a running viewer

mod backend;
mod etherpad;
mod file_store;
mod http;

use async_trait::async_trait;

use crate::error::SourceError;

pub use backend::BackendContentSource;
pub use etherpad::EtherpadClient;
pub use file_store::LocalFileStore;
pub use http::{ContentResponse, HttpContentSource, RevisionResponse};

/// Lookups the content fetcher needs
///
/// Implementations must be Send + Sync for use from spawned refresh tasks.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Content of a file location, `None` when there is nothing to show
    async fn file_content(&self, location: &str) -> Result<Option<String>, SourceError>;

    /// Current revision number of a pad
    async fn pad_revision(&self, location: &str) -> Result<u64, SourceError>;

    /// Pad text at an explicit revision, `None` when the pad has no text
    async fn pad_content(&self, location: &str, rev: u64) -> Result<Option<String>, SourceError>;
}
