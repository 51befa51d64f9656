//! Content fetcher
//!
//! One lookup per refresh tick. Backend failures are logged and reported as
//! `FetchOutcome::Unchanged` so the view keeps its last good render.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::params::{PageParams, Source};
use crate::source::ContentSource;

/// What a single fetch produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Nothing new: no source, absent content, stale revision or a failure
    Unchanged,
    /// File content, applied without a revision gate
    File { content: String },
    /// Pad text at a revision strictly newer than the last one seen
    Pad { rev: u64, content: String },
}

#[derive(Clone)]
pub struct ContentFetcher {
    source: Arc<dyn ContentSource>,
}

impl ContentFetcher {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    pub async fn fetch(&self, params: &PageParams, last_seen_revision: u64) -> FetchOutcome {
        match params.source {
            Source::File => self.fetch_file(&params.location).await,
            Source::Pad => self.fetch_pad(&params.location, last_seen_revision).await,
            Source::None => FetchOutcome::Unchanged,
        }
    }

    async fn fetch_file(&self, location: &str) -> FetchOutcome {
        match self.source.file_content(location).await {
            Ok(Some(content)) if !content.is_empty() => FetchOutcome::File {
                content: normalize(content),
            },
            Ok(_) => {
                debug!(location, "File has no content");
                FetchOutcome::Unchanged
            }
            Err(e) => {
                warn!(location, error = %e, "File fetch failed (non-fatal)");
                FetchOutcome::Unchanged
            }
        }
    }

    async fn fetch_pad(&self, location: &str, last_seen_revision: u64) -> FetchOutcome {
        let rev = match self.source.pad_revision(location).await {
            Ok(rev) => rev,
            Err(e) => {
                warn!(location, error = %e, "Pad revision check failed (non-fatal)");
                return FetchOutcome::Unchanged;
            }
        };

        if rev == 0 || rev <= last_seen_revision {
            return FetchOutcome::Unchanged;
        }

        debug!(location, rev, last_seen_revision, "New pad revision");
        match self.source.pad_content(location, rev).await {
            Ok(Some(content)) if !content.is_empty() => FetchOutcome::Pad {
                rev,
                content: normalize(content),
            },
            Ok(_) => FetchOutcome::Unchanged,
            Err(e) => {
                warn!(location, rev, error = %e, "Pad fetch failed (non-fatal)");
                FetchOutcome::Unchanged
            }
        }
    }
}

/// Line endings only; everything else is left to the transformer.
fn normalize(content: String) -> String {
    if content.contains('\r') {
        content.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        content
    }
}
