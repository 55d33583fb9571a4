use thiserror::Error;

use crate::attribution::AttributionError;
use crate::extractor::ExtractionFailure;
use crate::gate::RejectReason;

/// Terminal pipeline failures. Rewrite problems never appear here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no link was found in the text")]
    NotAUrl,

    #[error("{reason}")]
    Rejected { url: String, reason: RejectReason },

    #[error("{0}")]
    ExtractionFailed(#[from] ExtractionFailure),

    #[error("no source is registered for {0}")]
    UnknownSource(String),
}

impl PipelineError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::NotAUrl => "not-a-url",
            Self::Rejected { reason, .. } => reason.as_str(),
            Self::ExtractionFailed(failure) => failure.as_str(),
            Self::UnknownSource(_) => "unknown-source",
        }
    }
}

impl From<AttributionError> for PipelineError {
    fn from(err: AttributionError) -> Self {
        match err {
            AttributionError::UnknownSource(host) => Self::UnknownSource(host),
        }
    }
}
