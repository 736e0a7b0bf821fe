//! Feature-collection endpoints.

use crate::{data::geojson::GeoJson, prelude::HashMap, runtime, Error, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Shared HTTP client with a custom User-Agent. Building the client once
/// avoids TLS and connection pool setup for every request.
pub(crate) static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("geomap/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {}", e);
            Client::new()
        })
});

/// Anything that can produce a GeoJSON document for a URL.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<GeoJson>;
}

/// Fetches feature collections over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFeatureSource {
    client: Client,
}

impl HttpFeatureSource {
    pub fn new() -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFeatureSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeatureSource for HttpFeatureSource {
    async fn fetch(&self, url: &str) -> Result<GeoJson> {
        log::debug!("fetching features from {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        GeoJson::from_slice(&body)
    }
}

/// Serves documents from memory, optionally after a fixed latency.
/// Unknown URLs fail like a 404 would.
#[derive(Debug, Clone, Default)]
pub struct StaticFeatureSource {
    documents: HashMap<String, String>,
    latency: Option<Duration>,
}

impl StaticFeatureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.documents.insert(url.into(), body.into());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

#[async_trait]
impl FeatureSource for StaticFeatureSource {
    async fn fetch(&self, url: &str) -> Result<GeoJson> {
        if let Some(latency) = self.latency {
            runtime::runtime().sleep(latency).await;
        }
        let body = self
            .documents
            .get(url)
            .ok_or_else(|| Error::Layer(format!("no document at {}", url)))?;
        body.parse()
    }
}
