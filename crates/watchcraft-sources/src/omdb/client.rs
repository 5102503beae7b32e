use async_trait::async_trait;
use chrono::{Datelike, Utc};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use watchcraft_config::ProviderConfig;
use watchcraft_models::MediaEntry;

use crate::error::{SourceError, SourceResult};
use crate::omdb::api::{OmdbDetails, OmdbEnvelope, OmdbSearchResponse};
use crate::traits::{MetadataProvider, SearchResult};

/// OMDb (omdbapi.com) metadata provider
#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    episodes_per_season: u32,
}

impl OmdbClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, episodes_per_season: u32) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            episodes_per_season,
        }
    }

    pub fn from_config(config: &ProviderConfig, episodes_per_season: u32) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            episodes_per_season,
        })
    }

    /// One GET against the API root; `None` when OMDb answers "not found"
    async fn fetch(&self, params: &[(&str, &str)]) -> SourceResult<Option<serde_json::Value>> {
        let url = format!("{}/", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body: serde_json::Value = response.json().await?;
        let envelope: OmdbEnvelope = serde_json::from_value(body.clone())?;

        if envelope.is_success() {
            return Ok(Some(body));
        }
        if status.is_success() && envelope.is_not_found() {
            return Ok(None);
        }

        Err(SourceError::Provider(format!(
            "OMDb returned status {}: {}",
            status,
            envelope.error.unwrap_or_else(|| "unknown error".to_string())
        )))
    }
}

#[async_trait]
impl MetadataProvider for OmdbClient {
    fn provider_name(&self) -> &str {
        "omdb"
    }

    async fn try_search(&self, query: &str) -> SourceResult<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let Some(body) = self.fetch(&[("s", query)]).await? else {
            debug!(query = %query, "OMDb search found nothing");
            return Ok(Vec::new());
        };

        let response: OmdbSearchResponse = serde_json::from_value(body)?;
        let results: Vec<SearchResult> = response.search.into_iter().map(SearchResult::from).collect();

        info!(query = %query, results = results.len(), provider = "omdb", "Title search completed");
        Ok(results)
    }

    async fn try_get_details(&self, external_id: &str) -> SourceResult<Option<MediaEntry>> {
        let Some(body) = self.fetch(&[("i", external_id)]).await? else {
            debug!(external_id = %external_id, "OMDb has no such title");
            return Ok(None);
        };

        let details: OmdbDetails = serde_json::from_value(body)?;
        let entry = details
            .into_entry(self.episodes_per_season, Utc::now().year())
            .map_err(|e| SourceError::Provider(format!("Unusable OMDb record {}: {}", external_id, e)))?;

        debug!(external_id = %external_id, title = %entry.title, "Fetched OMDb details");
        Ok(Some(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = OmdbClient::new("key", "https://www.omdbapi.com/", 20);
        assert_eq!(client.base_url, "https://www.omdbapi.com");
    }

    #[tokio::test]
    async fn test_blank_query_skips_the_request() {
        // Unroutable base URL: any request would fail
        let client = OmdbClient::new("key", "http://127.0.0.1:9", 20);
        assert!(client.try_search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_provider_flattens_to_empty() {
        let client = OmdbClient::new("key", "http://127.0.0.1:9", 20);
        assert!(client.search("dark").await.is_empty());
        assert!(client.get_details("tt5753856").await.is_none());
    }
}
