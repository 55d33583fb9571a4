use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::scanner::CandidateUrl;
use crate::sources::SourceEntry;

/// Free-form text that may contain a link.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub candidates: Vec<CandidateUrl>,
    /// True when the text is essentially just one link.
    pub sole_url: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    pub domain: String,
    pub display_name_local: String,
    pub display_name_foreign: String,
}

impl From<&SourceEntry> for SourceSummary {
    fn from(entry: &SourceEntry) -> Self {
        Self {
            domain: entry.domain().to_string(),
            display_name_local: entry.display_name_local().to_string(),
            display_name_foreign: entry.display_name_foreign().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
