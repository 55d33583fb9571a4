//! Link detection over free-form editorial text.
//!
//! Pure functions only: nothing here touches the network.

use linkify::{LinkFinder, LinkKind};
use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;

/// Text left over after removing the link must be shorter than this for the
/// input to count as "just a link".
pub const SOLE_URL_RESIDUE_LIMIT: usize = 20;

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '،', '؛', '؟'];

/// A URL-shaped substring found in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CandidateUrl {
    /// Exactly as matched in the input.
    pub raw: String,
    /// Scheme-qualified, trailing punctuation removed.
    pub normalized: String,
}

/// Finds scheme-qualified (`http://`, `https://`) and bare `www.` links in
/// order of first appearance, deduplicated by normalized form.
pub fn scan(text: &str) -> Vec<CandidateUrl> {
    let mut finder = LinkFinder::new();
    finder.kinds(&[LinkKind::Url]);
    finder.url_must_have_scheme(false);

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for link in finder.links(text) {
        let raw = link.as_str();
        let Some(normalized) = normalize(raw) else {
            continue;
        };
        if seen.insert(normalized.clone()) {
            candidates.push(CandidateUrl {
                raw: raw.to_string(),
                normalized,
            });
        }
    }

    candidates
}

/// True when the text is essentially one link: after removing the first
/// detected link (raw, normalized and scheme-less forms) fewer than
/// [`SOLE_URL_RESIDUE_LIMIT`] non-whitespace characters remain.
pub fn is_sole_url(text: &str) -> bool {
    let Some(first) = scan(text).into_iter().next() else {
        return false;
    };

    let mut residue = text.to_string();
    for form in [
        first.raw.as_str(),
        first.normalized.as_str(),
        strip_scheme(&first.normalized),
    ] {
        if !form.is_empty() {
            residue = residue.replace(form, "");
        }
    }

    residue.chars().filter(|c| !c.is_whitespace()).count() < SOLE_URL_RESIDUE_LIMIT
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim_end_matches(TRAILING_PUNCTUATION);
    let lower = trimmed.to_ascii_lowercase();

    if lower.starts_with("https://") || lower.starts_with("http://") {
        if strip_scheme(trimmed).is_empty() {
            return None;
        }
        Some(trimmed.to_string())
    } else if lower.starts_with("www.") && trimmed.len() > "www.".len() {
        Some(format!("https://{trimmed}"))
    } else {
        None
    }
}

fn strip_scheme(url: &str) -> &str {
    url.find("://").map(|i| &url[i + 3..]).unwrap_or(url)
}
