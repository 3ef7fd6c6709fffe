//! Result Formatters
//!
//! Turn provider payloads into the plain text the model reasons over.

use std::fmt::Write as _;

use agent_core::text::floor_char_boundary;

use crate::provider::{CrawlResponse, ExtractResponse, SearchResponse};

/// Longest page body kept from an extraction
pub const EXTRACT_CONTENT_CHARS: usize = 8_000;

/// Longest per-page snippet kept from a crawl
pub const CRAWL_SNIPPET_CHARS: usize = 1_000;

/// Ranked hits: title, url, snippet
pub fn format_search_results(response: &SearchResponse) -> String {
    if response.results.is_empty() {
        return format!("No search results found for '{}'.", response.query);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Search results for '{}':", response.query);
    for (rank, hit) in response.results.iter().enumerate() {
        let _ = write!(
            out,
            "\n## {}. {}\nURL: {}\n{}\n",
            rank + 1,
            hit.title.trim(),
            hit.url,
            hit.content.trim()
        );
    }
    out
}

/// Page bodies, then images, then failures
pub fn format_extract_results(response: &ExtractResponse) -> String {
    let mut out = String::new();

    for page in &response.results {
        let _ = writeln!(out, "## Content from {}\n", page.url);
        match page.raw_content.as_deref().map(str::trim) {
            Some(content) if !content.is_empty() => {
                out.push_str(&clip(content, EXTRACT_CONTENT_CHARS));
                out.push('\n');
            }
            _ => out.push_str("(no text content)\n"),
        }
        if !page.images.is_empty() {
            out.push_str("\nImages:\n");
            for image in &page.images {
                let _ = writeln!(out, "- {image}");
            }
        }
        out.push('\n');
    }

    if !response.failed_results.is_empty() {
        out.push_str("## Failed URLs\n");
        for failed in &response.failed_results {
            let _ = writeln!(out, "- {}: {}", failed.url, failed.error);
        }
    }

    if out.is_empty() {
        return "No content could be extracted.".into();
    }
    out.trim_end().to_string()
}

/// One snippet per crawled page
pub fn format_crawl_results(response: &CrawlResponse) -> String {
    if response.results.is_empty() {
        return "The crawl returned no pages.".into();
    }

    let mut out = String::new();
    if let Some(base) = &response.base_url {
        let _ = writeln!(out, "Crawl of {base} ({} pages):", response.results.len());
    }
    for (i, page) in response.results.iter().enumerate() {
        let snippet = page
            .raw_content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map_or_else(|| "(no text content)".to_string(), |c| clip(c, CRAWL_SNIPPET_CHARS));
        let _ = write!(out, "\n## Page {}: {}\n{}\n", i + 1, page.url, snippet);
    }
    out
}

/// Cut at a char boundary, marking the cut
fn clip(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    format!("{}... [truncated]", &text[..floor_char_boundary(text, max)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{CrawlPage, ExtractedPage, FailedExtraction, SearchHit};

    #[test]
    fn test_search_formatting() {
        let response = SearchResponse {
            query: "tokio".into(),
            answer: None,
            results: vec![
                SearchHit {
                    title: "Tokio".into(),
                    url: "https://tokio.rs".into(),
                    content: "An async runtime".into(),
                    score: 0.9,
                },
                SearchHit {
                    title: "Docs".into(),
                    url: "https://docs.rs/tokio".into(),
                    content: "API reference".into(),
                    score: 0.5,
                },
            ],
        };

        let text = format_search_results(&response);
        let first = text.find("## 1. Tokio").unwrap();
        let second = text.find("## 2. Docs").unwrap();
        assert!(first < second);
        assert!(text.contains("URL: https://tokio.rs\nAn async runtime"));
    }

    #[test]
    fn test_empty_search() {
        let response = SearchResponse {
            query: "zzz".into(),
            ..Default::default()
        };
        assert_eq!(format_search_results(&response), "No search results found for 'zzz'.");
    }

    #[test]
    fn test_extract_formatting() {
        let response = ExtractResponse {
            results: vec![ExtractedPage {
                url: "https://a.com".into(),
                raw_content: Some("Hello".into()),
                images: vec!["https://a.com/x.png".into()],
            }],
            failed_results: vec![FailedExtraction {
                url: "https://b.com".into(),
                error: "timeout".into(),
            }],
        };

        let text = format_extract_results(&response);
        assert!(text.starts_with("## Content from https://a.com\n\nHello"));
        assert!(text.contains("- https://a.com/x.png"));
        assert!(text.ends_with("## Failed URLs\n- https://b.com: timeout"));
    }

    #[test]
    fn test_extract_clips_long_pages() {
        let response = ExtractResponse {
            results: vec![ExtractedPage {
                url: "https://long.com".into(),
                raw_content: Some("x".repeat(EXTRACT_CONTENT_CHARS * 2)),
                images: Vec::new(),
            }],
            failed_results: Vec::new(),
        };
        assert!(format_extract_results(&response).ends_with("[truncated]"));
    }

    #[test]
    fn test_crawl_formatting() {
        let response = CrawlResponse {
            base_url: Some("https://docs.rs".into()),
            results: vec![
                CrawlPage {
                    url: "https://docs.rs".into(),
                    raw_content: Some("Home".into()),
                },
                CrawlPage {
                    url: "https://docs.rs/empty".into(),
                    raw_content: None,
                },
            ],
        };

        let text = format_crawl_results(&response);
        assert!(text.starts_with("Crawl of https://docs.rs (2 pages):"));
        assert!(text.contains("## Page 1: https://docs.rs\nHome"));
        assert!(text.contains("## Page 2: https://docs.rs/empty\n(no text content)"));
    }

    #[test]
    fn test_clip_respects_char_boundaries() {
        let clipped = clip(&"ü".repeat(10), 5);
        assert_eq!(clipped, "üü... [truncated]");
    }
}
