//! Web Answer Tool

use async_trait::async_trait;
use std::sync::Arc;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema,
};

use crate::provider::SearchProvider;

const NAME: &str = "web_answer";

/// Direct question answering backed by a web search
pub struct WebAnswerTool {
    provider: Arc<dyn SearchProvider>,
}

impl WebAnswerTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for WebAnswerTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Answer the user's question using web search. The result can be used directly as the answer.".into(),
            parameters: vec![ParameterSchema::required("query", "string", "The question to answer")],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let Some(query) = call.str_arg("query") else {
            return Ok(ToolResult::failure(NAME, "Error: a non-empty query is required."));
        };

        tracing::info!(query, "Web answer");

        match self.provider.answer(query).await {
            Ok(answer) => Ok(ToolResult::success(NAME, answer)),
            Err(e) => {
                tracing::warn!(query, error = %e, "Web answer failed");
                Ok(ToolResult::failure(
                    NAME,
                    format!("Error while answering: {e}\nQuery attempted: {query}"),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockSearchProvider;
    use serde_json::json;

    #[tokio::test]
    async fn test_answer_verbatim() {
        let tool = WebAnswerTool::new(Arc::new(MockSearchProvider::new()));
        let result = tool
            .execute(&ToolCall::new(NAME, json!({"query": "meaning of life"})))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "The short answer to 'meaning of life' is 42.");
    }

    #[tokio::test]
    async fn test_answer_failure_names_query() {
        let tool = WebAnswerTool::new(Arc::new(MockSearchProvider::failing("quota exceeded")));
        let result = tool
            .execute(&ToolCall::new(NAME, json!({"query": "capital of peru"})))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("capital of peru"));
    }
}
