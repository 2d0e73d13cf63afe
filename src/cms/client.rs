//! HTTP client for the hosted query API

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};

use super::error::{CmsError, Result};
use super::queries;
use super::ContentStore;
use crate::cache::ResponseCache;
use crate::config::CmsConfig;
use crate::content::{MasterPost, Site, SitePost};

/// Query endpoint response envelope
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    ms: Option<u64>,
}

/// Read-only client for a single project/dataset
pub struct SanityClient {
    http: Client,
    query_url: String,
    token: Option<String>,
    cache: ResponseCache,
}

impl SanityClient {
    /// Build a client from configuration.
    ///
    /// The CDN host is only used for unauthenticated requests.
    pub fn new(config: &CmsConfig, revalidate: Duration) -> Result<Self> {
        let project_id = required(config.project_id.as_deref(), "project_id")?;
        let dataset = required(config.dataset.as_deref(), "dataset")?;

        let host = match config.api_host.as_deref() {
            Some(host) => host.trim_end_matches('/').to_string(),
            None if config.use_cdn && config.token.is_none() => {
                format!("https://{}.apicdn.sanity.io", project_id)
            }
            None => format!("https://{}.api.sanity.io", project_id),
        };
        let version = config.api_version.trim_start_matches('v');

        Ok(Self {
            http: Client::new(),
            query_url: format!("{}/v{}/data/query/{}", host, version, dataset),
            token: config.token.clone(),
            cache: ResponseCache::new(revalidate),
        })
    }

    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    /// Run a query. Parameters are passed as `$name=<json>`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        name: &str,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let encoded = params
            .iter()
            .map(|(key, value)| -> Result<(String, String)> {
                Ok((format!("${}", key), serde_json::to_string(value)?))
            })
            .collect::<Result<Vec<_>>>()?;
        let key_params: Vec<(&str, &str)> = encoded
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let cache_key = ResponseCache::key(query, &key_params);

        if let Some(value) = self.cache.get(&cache_key).await {
            tracing::trace!("Serving {} from cache", name);
            return Ok(serde_json::from_value(value)?);
        }

        let started = Instant::now();
        let mut request = self
            .http
            .get(&self.query_url)
            .query(&[("query", query)])
            .query(&encoded);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Query {} failed with {}", name, status);
            return Err(CmsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: QueryResponse = response.json().await?;
        tracing::debug!(
            "Fetched {} in {:?} (server {}ms)",
            name,
            started.elapsed(),
            envelope.ms.unwrap_or_default()
        );

        self.cache.insert(cache_key, envelope.result.clone()).await;
        Ok(serde_json::from_value(envelope.result)?)
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| CmsError::Config {
        message: format!("{} is not set", name),
    })
}

#[async_trait]
impl ContentStore for SanityClient {
    async fn sites(&self) -> Result<Vec<Site>> {
        self.fetch("sites", queries::SITES_QUERY, &[]).await
    }

    async fn master_posts(&self) -> Result<Vec<MasterPost>> {
        self.fetch("master_posts", queries::MASTER_POSTS_QUERY, &[])
            .await
    }

    async fn master_post(&self, slug: &str) -> Result<Option<MasterPost>> {
        self.fetch("master_post", queries::MASTER_POST_QUERY, &[("slug", slug)])
            .await
    }

    async fn site_posts(&self, site_id: &str) -> Result<Vec<SitePost>> {
        self.fetch(
            "site_posts",
            queries::SITE_POSTS_QUERY,
            &[("siteId", site_id)],
        )
        .await
    }

    async fn site_post_documents(&self, site_id: &str) -> Result<Vec<SitePost>> {
        self.fetch(
            "site_post_documents",
            queries::SITE_POST_QUERY,
            &[("siteId", site_id)],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config(host: &str) -> CmsConfig {
        CmsConfig {
            project_id: Some("proj".to_string()),
            dataset: Some("production".to_string()),
            api_host: Some(host.to_string()),
            ..CmsConfig::default()
        }
    }

    #[test]
    fn test_query_url_hosts() {
        let mut cms = CmsConfig {
            project_id: Some("proj".to_string()),
            dataset: Some("production".to_string()),
            ..CmsConfig::default()
        };
        let client = SanityClient::new(&cms, Duration::ZERO).unwrap();
        assert_eq!(
            client.query_url(),
            "https://proj.apicdn.sanity.io/v2024-01-01/data/query/production"
        );

        cms.token = Some("secret".to_string());
        cms.api_version = "v2021-10-21".to_string();
        let client = SanityClient::new(&cms, Duration::ZERO).unwrap();
        assert_eq!(
            client.query_url(),
            "https://proj.api.sanity.io/v2021-10-21/data/query/production"
        );
    }

    #[test]
    fn test_missing_project_is_config_error() {
        let err = SanityClient::new(&CmsConfig::default(), Duration::ZERO)
            .err()
            .unwrap();
        assert!(matches!(err, CmsError::Config { .. }));
    }

    #[tokio::test]
    async fn test_fetch_sends_query_and_json_params() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(GET)
                .path("/v2024-01-01/data/query/production")
                .query_param("query", queries::SITE_POSTS_QUERY)
                .query_param("$siteId", "\"us\"");
            then.status(200).json_body(json!({
                "ms": 3,
                "result": [{
                    "_id": "sp1",
                    "inheritanceEnabled": true,
                    "overriddenFields": ["title"],
                    "title": "Local",
                    "masterPost": {"title": "Master", "slug": {"current": "hello"}}
                }]
            }));
        })
        .await;

        let client = SanityClient::new(&config(&server.base_url()), Duration::ZERO).unwrap();
        let listing = client.site_listing("us").await.unwrap();

        mock.assert_async().await;
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].title.as_deref(), Some("Local"));
        assert_eq!(listing[0].slug_str(), Some("hello"));
    }

    #[tokio::test]
    async fn test_token_sent_as_bearer() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(GET)
                .header("authorization", "Bearer secret");
            then.status(200).json_body(json!({"result": []}));
        })
        .await;

        let mut cms = config(&server.base_url());
        cms.token = Some("secret".to_string());
        let client = SanityClient::new(&cms, Duration::ZERO).unwrap();
        assert!(client.sites().await.unwrap().is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET);
            then.status(400).body("bad query");
        })
        .await;

        let client = SanityClient::new(&config(&server.base_url()), Duration::ZERO).unwrap();
        match client.sites().await {
            Err(CmsError::Status { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad query");
            }
            other => panic!("unexpected result: {:?}", other.map(|s| s.len())),
        }
    }

    #[tokio::test]
    async fn test_null_result_is_none() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(GET).query_param("$slug", "\"missing\"");
            then.status(200).json_body(json!({"result": null}));
        })
        .await;

        let client = SanityClient::new(&config(&server.base_url()), Duration::ZERO).unwrap();
        assert!(client.master_post("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_responses_cached_within_window() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(GET);
            then.status(200)
                .json_body(json!({"result": [{"_id": "s1", "title": "US", "siteId": "us"}]}));
        })
        .await;

        let client =
            SanityClient::new(&config(&server.base_url()), Duration::from_secs(60)).unwrap();
        let first = client.sites().await.unwrap();
        let second = client.sites().await.unwrap();

        mock.assert_hits_async(1).await;
        assert_eq!(first, second);
        assert_eq!(second[0].site_id.as_deref(), Some("us"));
    }
}
