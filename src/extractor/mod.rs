pub mod cleaner;
pub mod errors;
pub mod heuristics;
pub mod language;
pub mod model;
pub mod reject;

#[cfg(test)]
mod tests;

pub use errors::ExtractionFailure;
pub use model::RawExtraction;

use chrono::Utc;
use scraper::Html;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::Url;

use crate::browser::{PageRenderer, RenderOptions};
use crate::gate::ValidatedUrl;

pub struct PageExtractor {
    renderer: Arc<dyn PageRenderer>,
    options: RenderOptions,
}

impl PageExtractor {
    pub fn new(renderer: Arc<dyn PageRenderer>, options: RenderOptions) -> Self {
        Self { renderer, options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders the page and runs the heuristic cascade over the result.
    /// `source_url` is always the validated link, even when the page
    /// redirected; relative media resolve against the final URL.
    #[instrument(skip(self), fields(url = %url.as_str()))]
    pub async fn extract(&self, url: &ValidatedUrl) -> Result<RawExtraction, ExtractionFailure> {
        let page = self
            .renderer
            .render(url, &self.options)
            .await
            .map_err(|e| {
                warn!(error = %e, "render failed");
                ExtractionFailure::from(e)
            })?;

        let mut extraction = extract_from_html(&page.html, &page.final_url).inspect_err(|e| {
            warn!(reason = e.as_str(), "extraction failed");
        })?;
        extraction.source_url = url.url().clone();

        info!(
            title = %extraction.title,
            body_chars = extraction.body.chars().count(),
            has_image = extraction.image_url.is_some(),
            language = ?extraction.language,
            "page extracted"
        );
        Ok(extraction)
    }
}

/// Runs the heuristic cascade over already-rendered HTML.
pub fn extract_from_html(html: &str, page_url: &Url) -> Result<RawExtraction, ExtractionFailure> {
    let document = Html::parse_document(html);

    let body = heuristics::extract_body(&document).unwrap_or_default();
    reject::ensure_sufficient(&body)?;

    let title = heuristics::first_match(&document, heuristics::TITLE_CHAIN)
        .unwrap_or_else(|| page_url.host_str().unwrap_or_default().to_string());
    let image_url = heuristics::first_match(&document, heuristics::IMAGE_CHAIN)
        .and_then(|raw| cleaner::resolve_media_url(page_url, &raw));
    let published_at = heuristics::first_match(&document, heuristics::DATE_CHAIN);
    let language = language::detect_language(&body).map(str::to_string);

    Ok(RawExtraction {
        title,
        body,
        image_url,
        published_at,
        source_url: page_url.clone(),
        language,
        extracted_at: Utc::now(),
    })
}
