//! Content API client
//!
//! Talks to the JSON endpoints served by `server::routes`:
//!
//! - `GET /api/files/file?filePath=..` -> `{content}`
//! - `GET /api/etherpad/pad-revs?pad=..` -> `{rev}`
//! - `GET /api/etherpad/pad?pad=..&rev=..` -> `{content}`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ContentSource;
use crate::error::SourceError;

/// Body of the file and pad content endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Body of the revision endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RevisionResponse {
    #[serde(default)]
    pub rev: Option<u64>,
}

pub struct HttpContentSource {
    client: Client,
    base_url: url::Url,
}

impl HttpContentSource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let base_url = url::Url::parse(base_url)
            .map_err(|e| SourceError::InvalidLocation(format!("{base_url}: {e}")))?;
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, SourceError> {
        self.base_url
            .join(path)
            .map_err(|e| SourceError::InvalidLocation(format!("{path}: {e}")))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let url = self.endpoint(path)?;
        Ok(self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn file_content(&self, location: &str) -> Result<Option<String>, SourceError> {
        let body: ContentResponse = self
            .get_json("/api/files/file", &[("filePath", location.to_string())])
            .await?;
        Ok(body.content)
    }

    async fn pad_revision(&self, location: &str) -> Result<u64, SourceError> {
        let body: RevisionResponse = self
            .get_json("/api/etherpad/pad-revs", &[("pad", location.to_string())])
            .await?;
        Ok(body.rev.unwrap_or(0))
    }

    async fn pad_content(&self, location: &str, rev: u64) -> Result<Option<String>, SourceError> {
        let body: ContentResponse = self
            .get_json(
                "/api/etherpad/pad",
                &[("pad", location.to_string()), ("rev", rev.to_string())],
            )
            .await?;
        Ok(body.content)
    }
}
