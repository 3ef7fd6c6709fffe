//! Mock Search Provider
//!
//! For testing and offline demos. Returns canned responses and records every
//! request it receives.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

use super::{
    CrawlPage, CrawlRequest, CrawlResponse, ExtractRequest, ExtractResponse, ExtractedPage,
    SearchHit, SearchProvider, SearchRequest, SearchResponse,
};
use crate::error::{ResearchError, Result};

/// A request observed by the mock
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderCall {
    Search(SearchRequest),
    Answer(String),
    Extract(ExtractRequest),
    Crawl(CrawlRequest),
}

/// Mock provider with static results
#[derive(Default)]
pub struct MockSearchProvider {
    /// When set, every call fails with this message
    failure: Option<String>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every call fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: ProviderCall) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        match &self.failure {
            Some(message) => Err(ResearchError::Decode(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.record(ProviderCall::Search(request.clone()))?;

        Ok(SearchResponse {
            query: request.query.clone(),
            answer: None,
            results: vec![
                SearchHit {
                    title: format!("Overview of {}", request.query),
                    url: "https://example.com/overview".into(),
                    content: format!("A summary of {}.", request.query),
                    score: 0.92,
                },
                SearchHit {
                    title: format!("{} in depth", request.query),
                    url: "https://example.org/deep-dive".into(),
                    content: "Longer discussion with references.".into(),
                    score: 0.71,
                },
            ],
        })
    }

    async fn answer(&self, query: &str) -> Result<String> {
        self.record(ProviderCall::Answer(query.to_string()))?;
        Ok(format!("The short answer to '{query}' is 42."))
    }

    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse> {
        self.record(ProviderCall::Extract(request.clone()))?;

        Ok(ExtractResponse {
            results: request
                .urls
                .iter()
                .map(|url| ExtractedPage {
                    url: url.clone(),
                    raw_content: Some(format!("Content of {url}")),
                    images: if request.include_images {
                        vec![format!("{url}/hero.png")]
                    } else {
                        Vec::new()
                    },
                })
                .collect(),
            failed_results: Vec::new(),
        })
    }

    async fn crawl(&self, request: &CrawlRequest) -> Result<CrawlResponse> {
        self.record(ProviderCall::Crawl(request.clone()))?;

        Ok(CrawlResponse {
            base_url: Some(request.url.clone()),
            results: vec![
                CrawlPage {
                    url: request.url.clone(),
                    raw_content: Some("Landing page".into()),
                },
                CrawlPage {
                    url: format!("{}/docs", request.url.trim_end_matches('/')),
                    raw_content: Some("Documentation index".into()),
                },
            ],
        })
    }

    fn name(&self) -> &str {
        "MockSearch"
    }
}
