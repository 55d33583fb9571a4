use thiserror::Error;

use crate::browser::RenderError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("the page took too long to load")]
    NavigationTimeout,

    #[error("the page content did not become ready in time")]
    DomTimeout,

    #[error("the page had no extractable article text ({length} characters found)")]
    InsufficientContent { length: usize },

    #[error("the page could not be loaded: {0}")]
    RenderFailed(String),
}

impl ExtractionFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NavigationTimeout => "navigation-timeout",
            Self::DomTimeout => "dom-timeout",
            Self::InsufficientContent { .. } => "insufficient-content",
            Self::RenderFailed(_) => "render-failed",
        }
    }
}

impl From<RenderError> for ExtractionFailure {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::NavigationTimeout(_) => Self::NavigationTimeout,
            RenderError::DomTimeout(_) => Self::DomTimeout,
            other => Self::RenderFailed(other.to_string()),
        }
    }
}
