//! HTTP client for the Google Fonts family index.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use crate::config::{FontsConfig, FONTS_API_KEY_ENV};
use crate::error::{BridgeError, Result};

use super::{FamilyIndex, FontSource};

#[derive(Debug)]
pub struct GoogleFontsClient {
    client: reqwest::Client,
    index_url: Url,
    index: OnceCell<FamilyIndex>,
}

impl GoogleFontsClient {
    pub fn new(config: &FontsConfig) -> Result<Self> {
        let key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                BridgeError::font_download(format!(
                    "missing Google Fonts API key; set {FONTS_API_KEY_ENV} or fonts.api_key"
                ))
            })?;

        let mut index_url = Url::parse(&config.api_url).map_err(|e| {
            BridgeError::font_download(format!("invalid fonts API url {}: {e}", config.api_url))
        })?;
        index_url.query_pairs_mut().append_pair("key", key);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            index_url,
            index: OnceCell::new(),
        })
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(|e| transport_error(url, e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::font_download(format!(
                "GET {} returned {status}: {}",
                redact_key(url),
                body.trim()
            )));
        }
        let bytes = response.bytes().await.map_err(|e| transport_error(url, e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl FontSource for GoogleFontsClient {
    async fn family_index(&self) -> Result<FamilyIndex> {
        let index = self
            .index
            .get_or_try_init(|| async {
                let bytes = self.get_bytes(self.index_url.as_str()).await?;
                let index: FamilyIndex = serde_json::from_slice(&bytes).map_err(|e| {
                    BridgeError::font_download(format!("unreadable family index: {e}"))
                })?;
                debug!(families = index.items.len(), "fetched font family index");
                Ok::<_, BridgeError>(index)
            })
            .await?;
        Ok(index.clone())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.get_bytes(url).await
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> BridgeError {
    BridgeError::font_download(format!(
        "GET {} failed: {}",
        redact_key(url),
        err.without_url()
    ))
}

/// Drop the `key` query parameter so credentials never reach logs or errors.
fn redact_key(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(name, _)| name != "key")
                .map(|(name, value)| (name.into_owned(), value.into_owned()))
                .collect();
            if kept.is_empty() {
                url.set_query(None);
            } else {
                url.query_pairs_mut().clear().extend_pairs(kept);
            }
            url.to_string()
        }
        Err(_) => raw.to_string(),
    }
}
