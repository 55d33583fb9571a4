//! Turns a raw extraction into a publishable draft, through a language
//! model when one is available and deterministically when it is not.

pub mod client;
pub mod prompt;

pub use client::{ChatCompletionsClient, RewriteService};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::attribution::Attribution;
use crate::extractor::RawExtraction;
use crate::extractor::cleaner::contains_markup;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const EXCERPT_CHARS: usize = 150;
/// Joins the citation phrase to the body in the fallback draft.
pub const CITATION_SEPARATOR: &str = "، ";

/// What the model is asked to rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
    pub title: String,
    /// At most [`prompt::MAX_BODY_CHARS`] characters.
    pub body: String,
    pub source_name_local: String,
    pub citation_phrase: String,
    pub language: Option<String>,
}

impl RewriteRequest {
    pub fn new(raw: &RawExtraction, attribution: &Attribution) -> Self {
        Self {
            title: raw.title.clone(),
            body: prompt::truncate_chars(&raw.body, prompt::MAX_BODY_CHARS).to_string(),
            source_name_local: attribution.local_name.clone(),
            citation_phrase: attribution.phrase.clone(),
            language: raw.language.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenArticle {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub ai_rewritten: bool,
}

/// Why a rewrite fell back. Logged, never returned to callers.
#[derive(Error, Debug)]
pub enum RewriteDegraded {
    #[error("no rewrite service configured")]
    NotConfigured,

    #[error("rewrite service timed out after {0:?}")]
    Timeout(Duration),

    #[error("rewrite service failed: {0}")]
    Service(anyhow::Error),

    #[error("rewrite response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("rewrite response field `{0}` is blank")]
    BlankField(&'static str),

    #[error("rewrite response field `{0}` contains markup")]
    Markup(&'static str),
}

#[derive(Debug, Deserialize)]
struct ModelArticle {
    title: String,
    content: String,
    excerpt: String,
}

pub struct RewriteOrchestrator {
    service: Option<Arc<dyn RewriteService>>,
    timeout: Duration,
}

impl RewriteOrchestrator {
    pub fn new(service: Arc<dyn RewriteService>, timeout: Duration) -> Self {
        Self {
            service: Some(service),
            timeout,
        }
    }

    /// Always produces the fallback draft.
    pub fn disabled() -> Self {
        Self {
            service: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    /// Infallible: any service problem degrades to [`fallback`].
    #[instrument(skip_all, fields(url = %raw.source_url))]
    pub async fn rewrite(&self, raw: &RawExtraction, attribution: &Attribution) -> RewrittenArticle {
        match self.try_rewrite(raw, attribution).await {
            Ok(article) => {
                info!("article rewritten");
                article
            }
            Err(RewriteDegraded::NotConfigured) => fallback(raw, attribution),
            Err(e) => {
                warn!(error = %e, "rewrite degraded");
                fallback(raw, attribution)
            }
        }
    }

    async fn try_rewrite(
        &self,
        raw: &RawExtraction,
        attribution: &Attribution,
    ) -> Result<RewrittenArticle, RewriteDegraded> {
        let service = self.service.as_ref().ok_or(RewriteDegraded::NotConfigured)?;
        let request = RewriteRequest::new(raw, attribution);

        let text = tokio::time::timeout(self.timeout, service.complete(&request))
            .await
            .map_err(|_| RewriteDegraded::Timeout(self.timeout))?
            .map_err(RewriteDegraded::Service)?;

        parse_response(&text)
    }
}

/// Parses model output into a draft. All three fields must be present,
/// non-blank and plain text. Accepted fields are returned unchanged.
pub fn parse_response(text: &str) -> Result<RewrittenArticle, RewriteDegraded> {
    let article: ModelArticle = serde_json::from_str(prompt::strip_code_blocks(text))?;

    for (name, value) in [
        ("title", article.title.as_str()),
        ("content", article.content.as_str()),
        ("excerpt", article.excerpt.as_str()),
    ] {
        if value.trim().is_empty() {
            return Err(RewriteDegraded::BlankField(name));
        }
        if contains_markup(value) {
            return Err(RewriteDegraded::Markup(name));
        }
    }

    Ok(RewrittenArticle {
        title: article.title,
        content: article.content,
        excerpt: article.excerpt,
        ai_rewritten: true,
    })
}

/// The deterministic draft used whenever the model is unavailable.
pub fn fallback(raw: &RawExtraction, attribution: &Attribution) -> RewrittenArticle {
    RewrittenArticle {
        title: raw.title.clone(),
        content: format!("{}{}{}", attribution.phrase, CITATION_SEPARATOR, raw.body),
        excerpt: excerpt(&raw.body),
        ai_rewritten: false,
    }
}

fn excerpt(body: &str) -> String {
    let head = prompt::truncate_chars(body, EXCERPT_CHARS);
    if head.len() < body.len() {
        format!("{head}...")
    } else {
        head.to_string()
    }
}
