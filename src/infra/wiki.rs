//! Thin asynchronous client for the OSRS Wiki real-time prices API.
//!
//! - `latest` returns every traded item's instant-buy/sell reference price.
//! - `mapping` returns item descriptors (name, buy limit, alch values).
//!
//! Caching and fallback live one layer up in [`crate::infra::feed`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use crate::config::Settings;
use crate::domain::{ItemMapping, PriceSnapshot};

pub const DEFAULT_BASE_URL: &str = "https://prices.runescape.wiki/api/v1/osrs";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum WikiClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("api error: {0}")]
    Api(String),
}

/// Upstream the price feed pulls from.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<PriceSnapshot, WikiClientError>;

    async fn fetch_mapping(&self) -> Result<ItemMapping, WikiClientError>;
}

#[derive(Debug, Deserialize)]
struct LatestEnvelope {
    data: Option<PriceSnapshot>,
}

#[derive(Clone, Debug)]
pub struct WikiClient {
    http: Client,
    base_url: Url,
}

impl WikiClient {
    pub fn new(base: &str, user_agent: &str, timeout: Duration) -> Result<Self, WikiClientError> {
        // Url::join drops the last path segment unless the base ends with '/'.
        let base_url = if base.ends_with('/') {
            Url::parse(base)?
        } else {
            Url::parse(&format!("{base}/"))?
        };
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, WikiClientError> {
        Self::new(
            &settings.wiki_base_url,
            &settings.user_agent,
            settings.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, WikiClientError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

#[async_trait]
impl PriceSource for WikiClient {
    async fn fetch_latest(&self) -> Result<PriceSnapshot, WikiClientError> {
        let envelope: LatestEnvelope = self.get_json("latest").await?;
        envelope
            .data
            .ok_or_else(|| WikiClientError::Api("response missing data".into()))
    }

    async fn fetch_mapping(&self) -> Result<ItemMapping, WikiClientError> {
        self.get_json("mapping").await
    }
}
