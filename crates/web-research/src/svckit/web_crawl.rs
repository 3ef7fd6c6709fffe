//! Web Crawl Tool
//!
//! Follows links from a root page. Depth and page count are fixed policy so
//! a single call has bounded cost.

use async_trait::async_trait;
use std::sync::Arc;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema,
};

use crate::format::format_crawl_results;
use crate::provider::{CrawlRequest, SearchProvider};
use crate::sanitize::normalize_url;

const NAME: &str = "web_crawl";

/// How far from the root URL the crawler may go
pub const CRAWL_MAX_DEPTH: u32 = 2;

/// Most pages a crawl may return
pub const CRAWL_LIMIT: u32 = 20;

pub struct WebCrawlTool {
    provider: Arc<dyn SearchProvider>,
}

impl WebCrawlTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for WebCrawlTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Crawl a website starting from a URL and return a snippet of every linked page. Useful for gathering everything reachable from a specific page.".into(),
            parameters: vec![
                ParameterSchema::required("url", "string", "The URL to start crawling from"),
                ParameterSchema::optional("instructions", "string", "Guidance for the crawler, such as which content to focus on or avoid"),
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let Some(raw) = call.str_arg("url") else {
            return Ok(ToolResult::failure(NAME, "Error: a URL is required."));
        };
        let url = normalize_url(raw);

        let request = CrawlRequest {
            url: url.clone(),
            max_depth: CRAWL_MAX_DEPTH,
            limit: CRAWL_LIMIT,
            instructions: call.str_arg("instructions").map(str::to_string),
        };

        tracing::info!(%url, "Web crawl");

        match self.provider.crawl(&request).await {
            Ok(response) => Ok(ToolResult::success(NAME, format_crawl_results(&response))),
            Err(e) => {
                tracing::warn!(%url, error = %e, "Web crawl failed");
                Ok(ToolResult::failure(
                    NAME,
                    format!("Error: {e}\nURL attempted: {url}\nFailed to crawl the website."),
                ))
            }
        }
    }
}
