//! URL argument sanitization
//!
//! Models occasionally pass a URL wrapped in a JSON envelope
//! (`{"url": "..."}`) or without a scheme. Every URL argument goes through
//! here before it reaches the provider.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static URL_ENVELOPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""url"\s*:\s*"([^"]+)""#).expect("envelope pattern is valid"));

/// Strip an accidental JSON envelope and ensure an http(s) scheme
pub fn normalize_url(raw: &str) -> String {
    let mut url = raw.trim();

    if url.starts_with('{') {
        if let Some(inner) = URL_ENVELOPE.captures(url).and_then(|c| c.get(1)) {
            url = inner.as_str().trim();
        }
    }

    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Normalize a `string | array | {"url": ...}` argument into a URL list
pub fn url_list(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::String(s) => {
            let trimmed = s.trim();
            // a JSON array smuggled inside a string
            if trimmed.starts_with('[') {
                serde_json::from_str::<Vec<String>>(trimmed).unwrap_or_else(|_| vec![s.clone()])
            } else {
                vec![s.clone()]
            }
        }
        Value::Array(items) => items.iter().filter_map(url_item).collect(),
        Value::Object(_) => url_item(value).into_iter().collect(),
        _ => Vec::new(),
    };

    raw.iter()
        .filter(|u| !u.trim().is_empty())
        .map(|u| normalize_url(u))
        .collect()
}

fn url_item(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_and_scheme() {
        assert_eq!(
            normalize_url(r#"{"url": "example.com/page"}"#),
            "https://example.com/page"
        );
        assert_eq!(
            normalize_url(r#" {"url":"http://example.com"} "#),
            "http://example.com"
        );
    }

    #[test]
    fn test_scheme_left_alone() {
        assert_eq!(normalize_url("https://b.com"), "https://b.com");
        assert_eq!(normalize_url("HTTP://B.COM"), "HTTP://B.COM");
        assert_eq!(normalize_url("  a.com "), "https://a.com");
    }

    #[test]
    fn test_brace_without_url_key() {
        assert_eq!(normalize_url(r#"{"href": "x.com"}"#), r#"https://{"href": "x.com"}"#);
    }

    #[test]
    fn test_list_normalization() {
        assert_eq!(
            url_list(&json!(["a.com", "https://b.com"])),
            vec!["https://a.com", "https://b.com"]
        );
        assert_eq!(url_list(&json!("a.com")), vec!["https://a.com"]);
        assert_eq!(url_list(&json!({"url": "c.org"})), vec!["https://c.org"]);
        assert_eq!(
            url_list(&json!(r#"["a.com", "d.net"]"#)),
            vec!["https://a.com", "https://d.net"]
        );
        assert!(url_list(&json!(["", 3])).is_empty());
        assert!(url_list(&json!(null)).is_empty());
    }
}
