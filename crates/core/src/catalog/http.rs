//! HTTP catalog source: fetches `index.json` and `<key>.json` from a base URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{CatalogManifest, RawCategoryFile};
use super::{CatalogError, CatalogSource};
use crate::config::CatalogConfig;

/// Catalog source backed by static JSON files served over HTTP.
pub struct HttpCatalogSource {
    client: Client,
    base_url: String,
    manifest_path: String,
}

impl HttpCatalogSource {
    /// Create a new HTTP source from the catalog configuration.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            manifest_path: config.manifest_path.trim_start_matches('/').to_string(),
        })
    }

    /// URL of the manifest file.
    pub fn manifest_url(&self) -> String {
        format!("{}/{}", self.base_url, self.manifest_path)
    }

    /// URL of a category file.
    pub fn category_url(&self, key: &str) -> String {
        format!("{}/{}.json", self.base_url, urlencoding::encode(key))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(CatalogError::StatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_manifest(&self) -> Result<CatalogManifest, CatalogError> {
        self.get_json(&self.manifest_url()).await
    }

    async fn fetch_category(&self, key: &str) -> Result<RawCategoryFile, CatalogError> {
        self.get_json(&self.category_url(key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_joined_without_double_slashes() {
        let mut config = CatalogConfig::new("http://media.lan/data/");
        config.manifest_path = "/index.json".to_string();
        let source = HttpCatalogSource::new(&config).unwrap();

        assert_eq!(source.manifest_url(), "http://media.lan/data/index.json");
        assert_eq!(source.category_url("kids"), "http://media.lan/data/kids.json");
    }

    #[test]
    fn test_manifest_url_inserts_separator() {
        let source = HttpCatalogSource::new(&CatalogConfig::new("http://media.lan/data")).unwrap();
        assert_eq!(source.manifest_url(), "http://media.lan/data/index.json");
    }

    #[test]
    fn test_category_key_is_url_encoded() {
        let source = HttpCatalogSource::new(&CatalogConfig::new("http://media.lan/data")).unwrap();
        assert_eq!(
            source.category_url("hindi movies"),
            "http://media.lan/data/hindi%20movies.json"
        );
    }
}
