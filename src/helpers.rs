//! Helper functions for the extraction pipeline
//!
//! This module provides the pure, synchronous normalizer utilities used
//! throughout the extractors:
//! - Doubled-text de-duplication
//! - Episode slug splitting
//! - Relative URL resolution
//! - Chapter name normalization and comparison
//! - Inline-script JSON literal extraction
//!
//! # Examples
//!
//! ```
//! use aniflux::helpers::{dedup_doubled, split_episode_slug};
//!
//! // Nested wrappers double text back-to-back
//! assert_eq!(dedup_doubled("ActionAction"), "Action");
//!
//! // Episode slugs carry the episode number as a suffix
//! let (anime, episode) = split_episode_slug("some-anime-12");
//! assert_eq!(anime, "some-anime");
//! assert_eq!(episode, "12");
//! ```

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashSet;

/// Collapse text that gets doubled by nested wrapper elements.
///
/// Only an even-length string whose first half exactly equals its second
/// half is reduced; everything else is returned unmodified.
pub fn dedup_doubled(text: &str) -> &str {
    let len = text.len();
    if len > 0 && len % 2 == 0 && text.is_char_boundary(len / 2) {
        let (first, second) = text.split_at(len / 2);
        if first == second {
            return first;
        }
    }
    text
}

/// Split a combined episode slug `<base>-<n>` into (anime slug, episode number).
///
/// A slug without a trailing numeric suffix is returned unchanged for both
/// fields.
pub fn split_episode_slug(slug: &str) -> (String, String) {
    let re = Regex::new(r"^(.+)-(\d+)$").unwrap();
    match re.captures(slug) {
        Some(cap) => (cap[1].to_string(), cap[2].to_string()),
        None => (slug.to_string(), slug.to_string()),
    }
}

/// Resolve a raw `src` value against the page origin.
///
/// Protocol-relative values get an explicit `https:` prefix, root-relative
/// values get the origin prefix, absolute values pass through unchanged.
pub fn normalize_media_url(raw: &str, origin: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    if raw.starts_with('/') {
        return format!("{}{}", origin.trim_end_matches('/'), raw);
    }
    raw.to_string()
}

/// Normalize a chapter name for comparison: numeric chapters compare as
/// numbers (decimal comma converted first), anything else as a lowercased
/// string.
pub fn normalize_chapter(value: &str) -> String {
    let cleaned = value.trim().replace(',', ".");
    if let Ok(n) = cleaned.parse::<f64>() {
        if n.is_finite() {
            if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                return format!("{}", n as i64);
            }
            return format!("{}", n);
        }
    }
    cleaned.to_lowercase()
}

/// Whether two chapter names refer to the same chapter
pub fn chapter_matches(source_name: &str, target_name: &str) -> bool {
    source_name == target_name || normalize_chapter(source_name) == normalize_chapter(target_name)
}

/// Extract a JSON literal assigned to a named variable inside a page's
/// inline scripts, e.g. `var episodes = [...];` or `var videos = {...};`.
///
/// A parse failure or an absent variable yields `None`, never an error:
/// the caller falls through to its next extraction strategy.
pub fn extract_script_json(document: &Html, name: &str) -> Option<Value> {
    let selector = Selector::parse("script").unwrap();
    let needle = format!("var {} =", name);
    let pattern = format!(
        r"(?s)var\s+{}\s*=\s*(\[.*?\]|\{{.*?\}});",
        regex::escape(name)
    );
    let re = Regex::new(&pattern).ok()?;
    for script in document.select(&selector) {
        let content = script.text().collect::<String>();
        if !content.contains(&needle) {
            continue;
        }
        if let Some(cap) = re.captures(&content) {
            if let Ok(value) = serde_json::from_str::<Value>(&cap[1]) {
                return Some(value);
            }
        }
    }
    None
}

/// De-duplicate while preserving first-seen order (reading order matters)
pub fn dedup_keep_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}
