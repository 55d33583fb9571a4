use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use utoipa::ToSchema;

use crate::sources::errors::RegistryError;

const BUILTIN_SOURCES: &str = include_str!("builtin.json");

/// A trusted news or government domain with its display names and the
/// phrases used to cite it.
///
/// Entries are validated when built, so every instance has a canonical
/// domain and at least one non-blank citation phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", try_from = "RawSourceEntry")]
pub struct SourceEntry {
    domain: String,
    display_name_local: String,
    display_name_foreign: String,
    citation_phrases: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceEntry {
    domain: String,
    display_name_local: String,
    display_name_foreign: String,
    citation_phrases: Vec<String>,
}

impl TryFrom<RawSourceEntry> for SourceEntry {
    type Error = RegistryError;

    fn try_from(raw: RawSourceEntry) -> Result<Self, Self::Error> {
        SourceEntry::new(
            raw.domain,
            raw.display_name_local,
            raw.display_name_foreign,
            raw.citation_phrases,
        )
    }
}

impl SourceEntry {
    pub fn new(
        domain: impl Into<String>,
        display_name_local: impl Into<String>,
        display_name_foreign: impl Into<String>,
        citation_phrases: Vec<String>,
    ) -> Result<Self, RegistryError> {
        let domain = domain.into();
        if !is_canonical_domain(&domain) {
            return Err(RegistryError::InvalidDomain(domain));
        }

        let display_name_local = display_name_local.into();
        let display_name_foreign = display_name_foreign.into();
        if display_name_local.trim().is_empty() || display_name_foreign.trim().is_empty() {
            return Err(RegistryError::BlankDisplayName(domain));
        }

        if citation_phrases.is_empty() {
            return Err(RegistryError::NoCitations(domain));
        }
        if citation_phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(RegistryError::BlankCitation(domain));
        }

        Ok(Self {
            domain,
            display_name_local,
            display_name_foreign,
            citation_phrases,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn display_name_local(&self) -> &str {
        &self.display_name_local
    }

    pub fn display_name_foreign(&self) -> &str {
        &self.display_name_foreign
    }

    /// Never empty.
    pub fn citation_phrases(&self) -> &[String] {
        &self.citation_phrases
    }

    /// True when `host` (already normalized) is this domain or one of its
    /// subdomains.
    fn covers(&self, host: &str) -> bool {
        host == self.domain
            || host
                .strip_suffix(self.domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

fn is_canonical_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with("www.")
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
}

/// Lower-cases a hostname and strips a trailing dot and a leading `www.`.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Immutable set of trusted sources, loaded once at startup and shared
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    entries: Vec<SourceEntry>,
}

impl SourceRegistry {
    pub fn new(entries: Vec<SourceEntry>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.domain.as_str()) {
                return Err(RegistryError::DuplicateDomain(entry.domain.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let entries: Vec<SourceEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The sources shipped with the crate.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_json(BUILTIN_SOURCES)
    }

    /// Finds the entry whose domain equals `hostname` or is a parent of it.
    /// Matching is case-insensitive and ignores a leading `www.`. When
    /// several domains match, the most specific one wins.
    pub fn lookup(&self, hostname: &str) -> Option<&SourceEntry> {
        let host = normalize_host(hostname);
        if host.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .filter(|entry| entry.covers(&host))
            .max_by_key(|entry| entry.domain.len())
    }

    /// Picks one phrase from the entry's bank, uniformly at random.
    pub fn pick_citation<'a, R: Rng + ?Sized>(&self, entry: &'a SourceEntry, rng: &mut R) -> &'a str {
        let idx = rng.gen_range(0..entry.citation_phrases.len());
        &entry.citation_phrases[idx]
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
