//! Research Profiles
//!
//! The two preconfigured sessions the gateway serves. Tool order is part of
//! the profile: it is the order the model sees the tool list in.

use std::fmt;
use std::sync::Arc;

use agent_core::{AgentSession, LlmProvider, SessionBuilder};

use crate::error::{ResearchError, Result};
use crate::prompts::{SIMPLE_SEARCH_PROMPT, SYSTEM_PROMPT};
use crate::provider::SearchProvider;
use crate::svckit::{FormatResearchTool, WebAnswerTool, WebCrawlTool, WebExtractTool, WebSearchTool};

/// Which preconfigured session to use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Short answers from search and answer tools
    Simple,
    /// Multi-step research with crawl, extract and formatting
    Deep,
}

impl Profile {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Deep => "deep",
        }
    }

    /// Tool names bound to this profile, in order
    pub const fn tool_names(self) -> &'static [&'static str] {
        match self {
            Self::Simple => &["web_search", "web_answer"],
            Self::Deep => &["web_search", "web_crawl", "web_extract", "format_research_response"],
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Model settings shared by both profiles
#[derive(Clone, Debug)]
pub struct ProfileOptions {
    /// Model driving the research sessions
    pub model: String,
    /// Model used by the research formatter
    pub formatter_model: String,
    /// Maximum model turns per query
    pub max_iterations: usize,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            model: "llama3.1".into(),
            formatter_model: "llama3.1".into(),
            max_iterations: 10,
        }
    }
}

/// Build the session for `profile`
pub fn build_session(
    profile: Profile,
    llm: Arc<dyn LlmProvider>,
    search: Arc<dyn SearchProvider>,
    options: &ProfileOptions,
) -> Result<AgentSession> {
    let builder = SessionBuilder::new()
        .provider(llm.clone())
        .name(profile.name())
        .model(options.model.clone())
        .max_iterations(options.max_iterations);

    let builder = match profile {
        Profile::Simple => builder
            .system_prompt(SIMPLE_SEARCH_PROMPT)
            .tool(WebSearchTool::new(search.clone()))
            .tool(WebAnswerTool::new(search)),
        Profile::Deep => builder
            .system_prompt(SYSTEM_PROMPT)
            .tool(WebSearchTool::new(search.clone()))
            .tool(WebCrawlTool::new(search.clone()))
            .tool(WebExtractTool::new(search))
            .tool(FormatResearchTool::new(llm, options.formatter_model.clone())),
    };

    builder
        .build()
        .map_err(|e| ResearchError::Config(format!("{profile} session: {e}")))
}
