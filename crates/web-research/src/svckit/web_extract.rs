//! Web Extract Tool
//!
//! Full page content for one or more URLs.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema,
};

use crate::format::format_extract_results;
use crate::provider::{ExtractDepth, ExtractRequest, SearchProvider};
use crate::sanitize::url_list;

const NAME: &str = "web_extract";

pub struct WebExtractTool {
    provider: Arc<dyn SearchProvider>,
}

impl WebExtractTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for WebExtractTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Extract the full content of one or more web pages. Returns the raw page text, image URLs when requested, and any URLs that could not be processed.".into(),
            parameters: vec![
                ParameterSchema::required("urls", "string|array", "A URL or a list of URLs"),
                ParameterSchema::optional("include_images", "boolean", "Also return image URLs found on the pages")
                    .with_default(json!(false)),
                ParameterSchema::optional("extract_depth", "string", "'basic' for standard extraction, 'advanced' for more detail")
                    .with_default(json!("basic"))
                    .with_enum(vec![json!("basic"), json!("advanced")]),
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let urls = call.arguments.get("urls").map(url_list).unwrap_or_default();
        if urls.is_empty() {
            return Ok(ToolResult::failure(NAME, "Error: at least one URL is required."));
        }
        let attempted = urls.join(", ");

        let extract_depth = match call.str_arg("extract_depth").map(str::parse::<ExtractDepth>) {
            None => ExtractDepth::default(),
            Some(Ok(depth)) => depth,
            Some(Err(e)) => {
                return Ok(ToolResult::failure(
                    NAME,
                    format!("Error: {e}\nURLs attempted: {attempted}"),
                ));
            }
        };

        let request = ExtractRequest {
            urls,
            include_images: call.bool_arg("include_images").unwrap_or(false),
            extract_depth,
        };

        tracing::info!(urls = %attempted, "Web extract");

        match self.provider.extract(&request).await {
            Ok(response) => Ok(ToolResult::success(NAME, format_extract_results(&response))),
            Err(e) => {
                tracing::warn!(urls = %attempted, error = %e, "Web extract failed");
                Ok(ToolResult::failure(
                    NAME,
                    format!("Error during extraction: {e}\nURLs attempted: {attempted}\nFailed to extract content."),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockSearchProvider, ProviderCall};

    fn extracted(provider: &MockSearchProvider) -> ExtractRequest {
        match provider.calls().into_iter().next() {
            Some(ProviderCall::Extract(request)) => request,
            other => panic!("expected extract call, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_urls_are_normalized() {
        let provider = Arc::new(MockSearchProvider::new());
        let tool = WebExtractTool::new(provider.clone());

        let result = tool
            .execute(&ToolCall::new(NAME, json!({"urls": ["a.com", "https://b.com"]})))
            .await
            .unwrap();

        assert!(result.success);
        let request = extracted(&provider);
        assert_eq!(request.urls, vec!["https://a.com", "https://b.com"]);
        assert_eq!(request.extract_depth, ExtractDepth::Basic);
        assert!(!request.include_images);
    }

    #[tokio::test]
    async fn test_envelope_argument() {
        let provider = Arc::new(MockSearchProvider::new());
        let tool = WebExtractTool::new(provider.clone());

        tool.execute(&ToolCall::new(
            NAME,
            json!({"urls": r#"{"url": "example.com/page"}"#, "include_images": "true", "extract_depth": "advanced"}),
        ))
        .await
        .unwrap();

        let request = extracted(&provider);
        assert_eq!(request.urls, vec!["https://example.com/page"]);
        assert!(request.include_images);
        assert_eq!(request.extract_depth, ExtractDepth::Advanced);
    }

    #[tokio::test]
    async fn test_failure_names_urls() {
        let tool = WebExtractTool::new(Arc::new(MockSearchProvider::failing("403 forbidden")));

        let result = tool
            .execute(&ToolCall::new(NAME, json!({"urls": "https://paywalled.example"})))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("403 forbidden"));
        assert!(result.output.contains("URLs attempted: https://paywalled.example"));
    }

    #[tokio::test]
    async fn test_missing_urls() {
        let provider = Arc::new(MockSearchProvider::new());
        let tool = WebExtractTool::new(provider.clone());

        let result = tool.execute(&ToolCall::new(NAME, json!({"urls": []}))).await.unwrap();
        assert!(!result.success);
        assert!(provider.calls().is_empty());
    }
}
