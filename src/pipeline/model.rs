use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use crate::pipeline::errors::PipelineError;

/// A ready-to-review article. Serialized with `success: true` inside
/// [`ExtractionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub source_url: String,
    /// Foreign-language display name, e.g. "Reuters".
    pub source_name: String,
    pub source_name_local: String,
    /// The citation phrase the draft carries.
    pub attribution: String,
    pub original_publish_date: Option<String>,
    pub ai_rewritten: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FailureRecord {
    /// Human-readable sentence.
    pub error: String,
    /// Kebab-case code, e.g. `domain-not-allowlisted`.
    pub reason: String,
}

impl From<&PipelineError> for FailureRecord {
    fn from(err: &PipelineError) -> Self {
        Self {
            error: err.to_string(),
            reason: err.reason_code().to_string(),
        }
    }
}

/// Either a full draft or a specific failure; nothing in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Success(ArticleDraft),
    Failure(FailureRecord),
}

impl ExtractionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<Result<ArticleDraft, PipelineError>> for ExtractionResult {
    fn from(result: Result<ArticleDraft, PipelineError>) -> Self {
        match result {
            Ok(draft) => Self::Success(draft),
            Err(err) => Self::Failure(FailureRecord::from(&err)),
        }
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Flagged<'a, T> {
            success: bool,
            #[serde(flatten)]
            record: &'a T,
        }

        match self {
            Self::Success(draft) => Flagged { success: true, record: draft }.serialize(serializer),
            Self::Failure(failure) => Flagged { success: false, record: failure }.serialize(serializer),
        }
    }
}
