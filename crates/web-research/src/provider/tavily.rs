//! Tavily Search Provider
//!
//! Implementation of `SearchProvider` over the Tavily HTTP API.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

use super::{
    CrawlPage, CrawlRequest, CrawlResponse, ExtractRequest, ExtractResponse, SearchProvider,
    SearchRequest, SearchResponse,
};
use crate::error::{ResearchError, Result};

/// Tavily client configuration
#[derive(Clone)]
pub struct TavilyConfig {
    /// API key, sent as a bearer token
    pub api_key: String,

    /// API root
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for TavilyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TavilyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.tavily.com".into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Read `TAVILY_API_KEY` (required) and `TAVILY_BASE_URL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("TAVILY_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ResearchError::Config(
                    "TAVILY_API_KEY environment variable is not set".into(),
                )
            })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("TAVILY_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }
}

/// Tavily API client
pub struct TavilyClient {
    http: reqwest::Client,
    config: TavilyConfig,
}

impl TavilyClient {
    pub fn new(config: TavilyConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        tracing::debug!(%url, "Calling Tavily");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResearchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ResearchError::Decode(e.to_string()))
    }
}

/// `/crawl` has answered with both a wrapped and a bare result list
#[derive(Deserialize)]
#[serde(untagged)]
enum CrawlPayload {
    Wrapped(CrawlResponse),
    Bare(Vec<CrawlPage>),
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let mut body = json!({
            "query": request.query,
            "max_results": request.max_results,
            "search_depth": "basic",
        });
        if let Some(range) = request.time_range {
            body["time_range"] = json!(range.as_str());
        }
        if !request.include_domains.is_empty() {
            body["include_domains"] = json!(request.include_domains);
        }

        self.post("search", body).await
    }

    async fn answer(&self, query: &str) -> Result<String> {
        let body = json!({
            "query": query,
            "search_depth": "advanced",
            "include_answer": true,
        });

        let response: SearchResponse = self.post("search", body).await?;
        response
            .answer
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| ResearchError::Decode("response carried no answer".into()))
    }

    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse> {
        let body = json!({
            "urls": request.urls,
            "include_images": request.include_images,
            "extract_depth": request.extract_depth,
        });

        self.post("extract", body).await
    }

    async fn crawl(&self, request: &CrawlRequest) -> Result<CrawlResponse> {
        let mut body = json!({
            "url": request.url,
            "max_depth": request.max_depth,
            "limit": request.limit,
        });
        if let Some(instructions) = &request.instructions {
            body["instructions"] = json!(instructions);
        }

        match self.post::<CrawlPayload>("crawl", body).await? {
            CrawlPayload::Wrapped(response) => Ok(response),
            CrawlPayload::Bare(results) => Ok(CrawlResponse {
                base_url: Some(request.url.clone()),
                results,
            }),
        }
    }

    fn name(&self) -> &str {
        "Tavily"
    }
}
