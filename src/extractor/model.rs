use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Article fields pulled from a rendered page, before any rewriting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExtraction {
    pub title: String,
    /// Paragraphs separated by blank lines. Never shorter than the content
    /// floor.
    pub body: String,
    pub image_url: Option<String>,
    /// As published by the page, unparsed.
    pub published_at: Option<String>,
    pub source_url: Url,
    pub language: Option<String>,
    pub extracted_at: DateTime<Utc>,
}

/// Collapses every whitespace run (newlines included) to one space and trims.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}
