//! Search Provider Integration
//!
//! Abstractions over a web search/extract/crawl API, plus the Tavily
//! implementation and an in-memory double.

mod mock;
mod tavily;

pub use mock::{MockSearchProvider, ProviderCall};
pub use tavily::{TavilyClient, TavilyConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ResearchError, Result};

/// Recency filter for search results
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "day" => Ok(Self::Day),
            "w" | "week" => Ok(Self::Week),
            "m" | "month" => Ok(Self::Month),
            "y" | "year" => Ok(Self::Year),
            other => Err(ResearchError::InvalidArgument(format!(
                "time_range must be one of day, week, month, year (got '{other}')"
            ))),
        }
    }
}

/// Extraction thoroughness
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractDepth {
    #[default]
    Basic,
    Advanced,
}

impl std::str::FromStr for ExtractDepth {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "advanced" => Ok(Self::Advanced),
            other => Err(ResearchError::InvalidArgument(format!(
                "extract_depth must be 'basic' or 'advanced' (got '{other}')"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: u64,
    pub time_range: Option<TimeRange>,
    pub include_domains: Vec<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: 5,
            time_range: None,
            include_domains: Vec::new(),
        }
    }
}

/// One ranked search hit
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractRequest {
    pub urls: Vec<String>,
    pub include_images: bool,
    pub extract_depth: ExtractDepth,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub url: String,
    #[serde(default)]
    pub raw_content: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedExtraction {
    pub url: String,
    #[serde(default)]
    pub error: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractResponse {
    #[serde(default)]
    pub results: Vec<ExtractedPage>,
    #[serde(default)]
    pub failed_results: Vec<FailedExtraction>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrawlRequest {
    pub url: String,
    pub max_depth: u32,
    pub limit: u32,
    pub instructions: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlPage {
    pub url: String,
    #[serde(default)]
    pub raw_content: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResponse {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub results: Vec<CrawlPage>,
}

/// Search provider trait (Strategy pattern)
///
/// Implement this for each web search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Ranked web search
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Direct answer to a question, grounded in a web search
    async fn answer(&self, query: &str) -> Result<String>;

    /// Page content for a list of URLs
    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse>;

    /// Pages reachable from a root URL
    async fn crawl(&self, request: &CrawlRequest) -> Result<CrawlResponse>;

    /// Provider name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_parsing() {
        assert_eq!("d".parse::<TimeRange>().unwrap(), TimeRange::Day);
        assert_eq!("Week".parse::<TimeRange>().unwrap(), TimeRange::Week);
        assert_eq!(" month ".parse::<TimeRange>().unwrap(), TimeRange::Month);
        assert_eq!("y".parse::<TimeRange>().unwrap(), TimeRange::Year);
        assert!("fortnight".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_extract_depth_parsing() {
        assert_eq!("ADVANCED".parse::<ExtractDepth>().unwrap(), ExtractDepth::Advanced);
        assert!("deep".parse::<ExtractDepth>().is_err());
    }
}
