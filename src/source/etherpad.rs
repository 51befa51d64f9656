//! Etherpad API Client
//!
//! Minimal client for the Etherpad HTTP API v1: revision counts and text at
//! a given revision. Every call carries the `apikey` query parameter.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::EtherpadConfig;
use crate::error::SourceError;

/// Etherpad wraps every payload in `{code, message, data}`; `code != 0` is a failure.
#[derive(Debug, Deserialize)]
struct EtherpadResponse<T> {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct RevisionsCount {
    revisions: u64,
}

#[derive(Debug, Deserialize)]
struct PadText {
    text: Option<String>,
}

#[derive(Clone)]
pub struct EtherpadClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl EtherpadClient {
    pub fn new(config: &EtherpadConfig) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let url = format!("{}/{}", self.base_url, method);

        let response: EtherpadResponse<T> = self
            .client
            .get(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        unwrap_response(response)
    }

    /// `getRevisionsCount` for a pad
    pub async fn revisions_count(&self, pad_id: &str) -> Result<u64, SourceError> {
        let data: RevisionsCount = self
            .call("getRevisionsCount", &[("padID", pad_id.to_string())])
            .await?;
        Ok(data.revisions)
    }

    /// `getText` for a pad, at `rev` when given
    pub async fn text(&self, pad_id: &str, rev: Option<u64>) -> Result<Option<String>, SourceError> {
        let mut params = vec![("padID", pad_id.to_string())];
        if let Some(rev) = rev {
            params.push(("rev", rev.to_string()));
        }
        let data: PadText = self.call("getText", &params).await?;
        Ok(data.text)
    }
}

fn unwrap_response<T>(response: EtherpadResponse<T>) -> Result<T, SourceError> {
    if response.code != 0 {
        return Err(SourceError::Etherpad {
            code: response.code,
            message: response.message,
        });
    }
    response
        .data
        .ok_or_else(|| SourceError::Response("Etherpad response without data".to_string()))
}
