//! Web Search Tool
//!
//! Ranked web search with optional recency and domain filters.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema,
};

use crate::format::format_search_results;
use crate::provider::{SearchProvider, SearchRequest, TimeRange};

const NAME: &str = "web_search";

/// Tool for ranked web search
pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    fn request(call: &ToolCall, query: &str) -> Result<SearchRequest, String> {
        let mut request = SearchRequest::new(query);

        if let Some(max) = call.u64_arg("max_results") {
            request.max_results = max;
        }
        if let Some(range) = call.str_arg("time_range") {
            request.time_range = Some(range.parse::<TimeRange>().map_err(|e| e.to_string())?);
        }
        request.include_domains = match call.arguments.get("include_domains") {
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        Ok(request)
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Perform a web search. Returns the title, url and content of each result, ranked by relevance. Use 5 results for simple queries and 10 for complex ones.".into(),
            parameters: vec![
                ParameterSchema::required("query", "string", "The search query"),
                ParameterSchema::optional("max_results", "integer", "Maximum number of results to return")
                    .with_default(json!(5)),
                ParameterSchema::optional("time_range", "string", "Only return content published within this period")
                    .with_enum(vec![json!("day"), json!("week"), json!("month"), json!("year")]),
                ParameterSchema::optional("include_domains", "string|array", "Restrict results to these domains (comma-separated or list)"),
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let Some(query) = call.str_arg("query") else {
            return Ok(ToolResult::failure(NAME, "Error: a non-empty query is required."));
        };

        let request = match Self::request(call, query) {
            Ok(request) => request,
            Err(e) => {
                return Ok(ToolResult::failure(
                    NAME,
                    format!("Error: {e}\nQuery attempted: {query}"),
                ));
            }
        };

        tracing::info!(query, max_results = request.max_results, "Web search");

        match self.provider.search(&request).await {
            Ok(response) => Ok(ToolResult::success(NAME, format_search_results(&response))),
            Err(e) => {
                tracing::warn!(query, error = %e, "Web search failed");
                Ok(ToolResult::failure(
                    NAME,
                    format!("Error during search: {e}\nQuery attempted: {query}\nFailed to retrieve search results."),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockSearchProvider, ProviderCall};

    #[tokio::test]
    async fn test_search_defaults() {
        let provider = Arc::new(MockSearchProvider::new());
        let tool = WebSearchTool::new(provider.clone());

        let result = tool
            .execute(&ToolCall::new(NAME, json!({"query": "rust"})))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("## 1. Overview of rust"));
        assert_eq!(provider.calls(), vec![ProviderCall::Search(SearchRequest::new("rust"))]);
    }

    #[tokio::test]
    async fn test_search_passes_filters_through() {
        let provider = Arc::new(MockSearchProvider::new());
        let tool = WebSearchTool::new(provider.clone());

        tool.execute(&ToolCall::new(
            NAME,
            json!({"query": "news", "max_results": 50, "time_range": "d", "include_domains": "a.com, b.com"}),
        ))
        .await
        .unwrap();

        let ProviderCall::Search(request) = &provider.calls()[0] else { panic!("expected search") };
        assert_eq!(request.max_results, 50);
        assert_eq!(request.time_range, Some(TimeRange::Day));
        assert_eq!(request.include_domains, vec!["a.com", "b.com"]);
    }

    #[tokio::test]
    async fn test_invalid_time_range_is_reported() {
        let provider = Arc::new(MockSearchProvider::new());
        let tool = WebSearchTool::new(provider.clone());

        let result = tool
            .execute(&ToolCall::new(NAME, json!({"query": "news", "time_range": "decade"})))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("Query attempted: news"));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_text() {
        let tool = WebSearchTool::new(Arc::new(MockSearchProvider::failing("connection refused")));

        let result = tool
            .execute(&ToolCall::new(NAME, json!({"query": "rust traits"})))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("connection refused"));
        assert!(result.output.contains("rust traits"));
    }
}
