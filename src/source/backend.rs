//! Direct backend access: filesystem for files, Etherpad for pads.

use async_trait::async_trait;

use super::{ContentSource, EtherpadClient, LocalFileStore};
use crate::error::SourceError;

pub struct BackendContentSource {
    files: LocalFileStore,
    etherpad: EtherpadClient,
}

impl BackendContentSource {
    pub fn new(files: LocalFileStore, etherpad: EtherpadClient) -> Self {
        Self { files, etherpad }
    }

    pub fn files(&self) -> &LocalFileStore {
        &self.files
    }

    pub fn etherpad(&self) -> &EtherpadClient {
        &self.etherpad
    }
}

#[async_trait]
impl ContentSource for BackendContentSource {
    async fn file_content(&self, location: &str) -> Result<Option<String>, SourceError> {
        self.files.read(location).await
    }

    async fn pad_revision(&self, location: &str) -> Result<u64, SourceError> {
        self.etherpad.revisions_count(location).await
    }

    async fn pad_content(&self, location: &str, rev: u64) -> Result<Option<String>, SourceError> {
        self.etherpad.text(location, Some(rev)).await
    }
}
