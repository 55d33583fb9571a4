//! Maps an article URL to the source credit that must travel with it.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::sources::{CitationStrategy, RandomCitation, SourceRegistry};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributionError {
    #[error("no registry entry covers host {0}")]
    UnknownSource(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub local_name: String,
    pub foreign_name: String,
    /// Always one of the matched entry's citation phrases.
    pub phrase: String,
}

pub struct AttributionResolver {
    registry: Arc<SourceRegistry>,
    strategy: Arc<dyn CitationStrategy>,
}

impl AttributionResolver {
    pub fn new(registry: Arc<SourceRegistry>, strategy: Arc<dyn CitationStrategy>) -> Self {
        Self { registry, strategy }
    }

    pub fn with_random_citation(registry: Arc<SourceRegistry>) -> Self {
        Self::new(registry, Arc::new(RandomCitation))
    }

    /// Never falls back to a generic credit; an uncovered host is an error.
    pub fn resolve(&self, url: &Url) -> Result<Attribution, AttributionError> {
        let host = url.host_str().unwrap_or_default();
        let Some(entry) = self.registry.lookup(host) else {
            warn!(host = %host, "no source entry for host");
            return Err(AttributionError::UnknownSource(host.to_string()));
        };

        let phrase = self.strategy.select(entry, url);
        debug!(domain = entry.domain(), phrase = %phrase, "citation selected");

        Ok(Attribution {
            local_name: entry.display_name_local().to_string(),
            foreign_name: entry.display_name_foreign().to_string(),
            phrase: phrase.to_string(),
        })
    }
}
