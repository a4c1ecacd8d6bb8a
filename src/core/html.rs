// src/core/html.rs
//! Anchor extraction from raw HTML.
//!
//! Pattern-based on purpose: no DOM is built. An anchor is "opening `<a` tag
//! carrying an `href`, inner content, closing `</a>`", matched
//! case-insensitively across line breaks. Regions that do not fit the pattern
//! (unclosed anchors, stray tags) are simply skipped.

use std::sync::LazyLock;

use regex::Regex;

use super::sanitize::{normalize_entities, normalize_ws};

// Attribute text inside a tag; quoted values may contain `>`.
const ATTR_RUN: &str = r#"(?:[^>"']|"[^"]*"|'[^']*')*"#;

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    // `href` must start its own attribute (`data-href` does not count).
    let pattern = format!(
        r#"(?is)<a\b{ATTR_RUN}?\shref\s*=\s*(?:"([^"]*)"|'([^']*)'){ATTR_RUN}>(.*?)</a\s*>"#
    );
    Regex::new(&pattern).expect("anchor pattern is valid")
});

/// One `(url, label)` pair pulled from an anchor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedLink {
    /// Trimmed href. Never empty, never `#`, never `mailto:`.
    pub url: String,
    /// Visible text with tags stripped; `None` when nothing visible remains.
    pub label: Option<String>,
}

impl ExtractedLink {
    pub fn new(url: impl Into<String>, label: Option<&str>) -> Self {
        Self { url: url.into(), label: label.map(str::to_string) }
    }
}

/// All eligible anchors in document order. Duplicates are kept.
pub fn extract_links(html: &str) -> Vec<ExtractedLink> {
    let mut out = Vec::new();
    for cap in ANCHOR.captures_iter(html) {
        let href = cap.get(1).or_else(|| cap.get(2)).map_or("", |m| m.as_str());
        let url = href.trim();
        if !is_eligible(url) {
            continue;
        }

        let inner = cap.get(3).map_or("", |m| m.as_str());
        let text = strip_tags(&normalize_entities(inner));
        let label = if text.is_empty() { None } else { Some(text) };

        out.push(ExtractedLink { url: s!(url), label });
    }
    out
}

fn is_eligible(url: &str) -> bool {
    !url.is_empty() && url != "#" && !url.starts_with("mailto:")
}

/// Remove all `<...>` tags, then collapse whitespace.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&out)
}
