//! # web-research
//!
//! Web research tools for agent sessions: search, direct answers, page
//! extraction, site crawling and research formatting.
//!
//! ## Profiles
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  simple   web_search ─ web_answer                            │
//! │           short, direct answers                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  deep     web_search ─ web_crawl ─ web_extract               │
//! │                      └─▶ format_research_response            │
//! │           multi-step research, cited markdown                │
//! └──────────────────────────────────────────────────────────────┘
//!
//!   tools ──▶ SearchProvider (Tavily / Mock) ──▶ formatted text
//! ```
//!
//! Tools never fail a query: provider errors are returned to the model as
//! text naming what was attempted.

pub mod error;
pub mod format;
pub mod profile;
pub mod prompts;
pub mod provider;
pub mod sanitize;
pub mod svckit;

pub use error::{ResearchError, Result};
pub use profile::{Profile, ProfileOptions, build_session};
pub use provider::{MockSearchProvider, SearchProvider, TavilyClient, TavilyConfig};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{
        FormatResearchTool, WebAnswerTool, WebCrawlTool, WebExtractTool, WebSearchTool,
    };
}
