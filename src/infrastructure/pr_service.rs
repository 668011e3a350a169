//! # PullRequestService Client
//!
//! HTTP adapter for starting and stopping pull request processing.
//! Built once at startup from validated settings and shared read-only by every execution.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::domain::config::PrServiceSettings;
use crate::domain::traits::{BackendStatus, PullRequestService};

const START_PATH: &str = "/host/services";

pub struct PrServiceClient {
    http: Client,
    settings: PrServiceSettings,
}

impl PrServiceClient {
    pub fn new(settings: PrServiceSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { http, settings })
    }

    /// `<scheme>://<host>/host/services?apikey=...`
    pub fn start_url(&self) -> Url {
        let mut url = self.settings.url.clone();
        url.set_path(START_PATH);
        with_api_key(url, &self.settings.api_key)
    }

    /// The configured URL itself, with the API key.
    pub fn stop_url(&self) -> Url {
        with_api_key(self.settings.url.clone(), &self.settings.api_key)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> BackendStatus {
        match request.send().await {
            Ok(response) => {
                let status = response.status();
                BackendStatus {
                    success: status.is_success(),
                    description: status.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!("PullRequestService request failed: {}", e);
                BackendStatus {
                    success: false,
                    description: e.to_string(),
                }
            }
        }
    }
}

/// Sets `apikey`, keeping every other query parameter.
fn with_api_key(mut url: Url, api_key: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "apikey")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("apikey", api_key);
    url
}

#[async_trait]
impl PullRequestService for PrServiceClient {
    async fn start(&self) -> BackendStatus {
        let request = self
            .http
            .post(self.start_url())
            .header(reqwest::header::CONTENT_TYPE, "application/xml")
            .body(self.settings.payload.clone());
        self.send(request).await
    }

    async fn stop(&self) -> BackendStatus {
        let request = self.http.delete(self.stop_url());
        self.send(request).await
    }
}
