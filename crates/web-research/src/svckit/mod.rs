//! Service Kit - Agent Tools
//!
//! Research tools implementing `agent_core::Tool`. Every tool is total: a
//! provider failure comes back as error text, never as an `Err`.

mod format_research;
mod web_answer;
mod web_crawl;
mod web_extract;
mod web_search;

pub use format_research::FormatResearchTool;
pub use web_answer::WebAnswerTool;
pub use web_crawl::{CRAWL_LIMIT, CRAWL_MAX_DEPTH, WebCrawlTool};
pub use web_extract::WebExtractTool;
pub use web_search::WebSearchTool;
