use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

use crate::sources::registry::SourceEntry;

/// Chooses which citation phrase to attach for a source.
///
/// Implementations must return a member of `entry.citation_phrases()`.
pub trait CitationStrategy: Send + Sync {
    fn select<'a>(&self, entry: &'a SourceEntry, source_url: &Url) -> &'a str;
}

/// Uniform random choice from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCitation;

impl CitationStrategy for RandomCitation {
    fn select<'a>(&self, entry: &'a SourceEntry, _source_url: &Url) -> &'a str {
        use rand::Rng;

        let phrases = entry.citation_phrases();
        &phrases[rand::thread_rng().gen_range(0..phrases.len())]
    }
}

/// Derives the phrase from an md5 of the source URL, so the same article
/// always gets the same citation.
#[derive(Debug, Default, Clone, Copy)]
pub struct StableCitation;

impl CitationStrategy for StableCitation {
    fn select<'a>(&self, entry: &'a SourceEntry, source_url: &Url) -> &'a str {
        let digest = md5::compute(source_url.as_str().as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.0[..8]);
        let phrases = entry.citation_phrases();
        let idx = (u64::from_be_bytes(head) % phrases.len() as u64) as usize;
        &phrases[idx]
    }
}

/// Cycles through each bank in order. The cursor is shared across sources.
#[derive(Debug, Default)]
pub struct RoundRobinCitation {
    next: AtomicUsize,
}

impl RoundRobinCitation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CitationStrategy for RoundRobinCitation {
    fn select<'a>(&self, entry: &'a SourceEntry, _source_url: &Url) -> &'a str {
        let phrases = entry.citation_phrases();
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % phrases.len();
        &phrases[idx]
    }
}
