//! Scan → gate → extract → attribute → rewrite, for one piece of text.

pub mod errors;
pub mod model;

pub use errors::PipelineError;
pub use model::{ArticleDraft, ExtractionResult, FailureRecord};

use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::attribution::AttributionResolver;
use crate::extractor::PageExtractor;
use crate::gate::{TrustGate, ValidatedUrl};
use crate::rewrite::RewriteOrchestrator;
use crate::scanner;

pub struct Pipeline {
    gate: TrustGate,
    extractor: PageExtractor,
    attribution: AttributionResolver,
    rewriter: RewriteOrchestrator,
}

impl Pipeline {
    pub fn new(
        gate: TrustGate,
        extractor: PageExtractor,
        attribution: AttributionResolver,
        rewriter: RewriteOrchestrator,
    ) -> Self {
        Self {
            gate,
            extractor,
            attribution,
            rewriter,
        }
    }

    pub fn gate(&self) -> &TrustGate {
        &self.gate
    }

    /// Like [`Pipeline::process`], folded into the wire result.
    pub async fn run(&self, text: &str) -> ExtractionResult {
        self.process(text).await.into()
    }

    pub async fn process(&self, text: &str) -> Result<ArticleDraft, PipelineError> {
        let span = info_span!("pipeline", request_id = %Uuid::new_v4());
        self.process_inner(text).instrument(span).await
    }

    async fn process_inner(&self, text: &str) -> Result<ArticleDraft, PipelineError> {
        let url = self.select_candidate(text).await?;
        info!(url = %url.as_str(), source = url.matched_source().domain(), "link accepted");

        let raw = self.extractor.extract(&url).await?;

        let attribution = self.attribution.resolve(url.url())?;

        let rewritten = self.rewriter.rewrite(&raw, &attribution).await;

        Ok(ArticleDraft {
            title: rewritten.title,
            content: rewritten.content,
            excerpt: rewritten.excerpt,
            image_url: raw.image_url,
            source_url: raw.source_url.to_string(),
            source_name: attribution.foreign_name,
            source_name_local: attribution.local_name,
            attribution: attribution.phrase,
            original_publish_date: raw.published_at,
            ai_rewritten: rewritten.ai_rewritten,
        })
    }

    /// First candidate that passes the gate. When none does, the first
    /// candidate's rejection is reported.
    async fn select_candidate(&self, text: &str) -> Result<ValidatedUrl, PipelineError> {
        let candidates = scanner::scan(text);
        if candidates.is_empty() {
            return Err(PipelineError::NotAUrl);
        }

        let mut first_rejection = None;
        for candidate in candidates {
            match self.gate.validate_resolved(&candidate.normalized).await {
                Ok(url) => return Ok(url),
                Err(reason) => {
                    first_rejection.get_or_insert(PipelineError::Rejected {
                        url: candidate.normalized,
                        reason,
                    });
                }
            }
        }
        Err(first_rejection.unwrap_or(PipelineError::NotAUrl))
    }
}
