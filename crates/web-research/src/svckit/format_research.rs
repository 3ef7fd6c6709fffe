//! Research Formatter Tool
//!
//! Hands raw research to a tool-less formatter session and returns the
//! cited, structured rewrite.

use async_trait::async_trait;
use std::sync::Arc;

use agent_core::{
    AgentSession, LlmProvider, Result as CoreResult, Tool, ToolCall, ToolRegistry, ToolResult,
    ToolSchema, session::SessionConfig, tool::ParameterSchema,
};

use crate::prompts::RESEARCH_FORMATTER_PROMPT;

const NAME: &str = "format_research_response";

/// Formatter turns allowed per call; it has no tools, so one is enough
const FORMATTER_ITERATIONS: usize = 1;

pub struct FormatResearchTool {
    formatter: AgentSession,
}

impl FormatResearchTool {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        let mut config = SessionConfig {
            name: "formatter".into(),
            system_prompt: RESEARCH_FORMATTER_PROMPT.into(),
            max_iterations: FORMATTER_ITERATIONS,
            ..SessionConfig::default()
        };
        config.generation.model = model.into();

        Self {
            formatter: AgentSession::new(provider, ToolRegistry::new(), config),
        }
    }

    /// Input message for the formatter session
    fn brief(content: &str, style: Option<&str>, query: Option<&str>) -> String {
        let mut brief = format!("Research Content:\n{content}\n\n");
        if let Some(style) = style {
            brief.push_str(&format!("Requested Format Style: {style}\n\n"));
        }
        if let Some(query) = query {
            brief.push_str(&format!("Original User Query: {query}\n\n"));
        }
        brief.push_str(
            "Please format this research content according to the guidelines and appropriate style.",
        );
        brief
    }
}

#[async_trait]
impl Tool for FormatResearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Format research content into a well-structured, properly cited markdown response that clearly addresses the user's query. Call this last, with everything gathered.".into(),
            parameters: vec![
                ParameterSchema::required("research_content", "string", "The raw research content to format"),
                ParameterSchema::optional("format_style", "string", "Desired style, e.g. blog, report, executive summary, bullet points, direct answer"),
                ParameterSchema::optional("user_query", "string", "The original user question, used to pick an appropriate format"),
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let Some(content) = call.str_arg("research_content") else {
            return Ok(ToolResult::failure(NAME, "Error in research formatting: no research content provided"));
        };
        let brief = Self::brief(content, call.str_arg("format_style"), call.str_arg("user_query"));

        tracing::info!(chars = content.len(), "Formatting research");

        match self.formatter.run(&brief).await {
            Ok(formatted) => Ok(ToolResult::success(NAME, formatted)),
            Err(e) => {
                tracing::warn!(error = %e, "Research formatting failed");
                Ok(ToolResult::failure(NAME, format!("Error in research formatting: {e}")))
            }
        }
    }
}
