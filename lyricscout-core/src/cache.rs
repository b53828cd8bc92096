use crate::lyrics::LyricsLookup;
use dashmap::DashMap;
use tracing::debug;

const LOG_TARGET: &str = "lyricscout::cache";

/// Cache key: source name plus the raw, unnormalized query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: String,
    pub query: String,
}

impl CacheKey {
    #[must_use]
    pub fn new(source: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            query: query.into(),
        }
    }
}

/// In-memory memo of lookup outcomes, shared between in-flight lookups.
///
/// Both found and not-found outcomes are stored, so a failed lookup stays
/// failed until [`LyricsCache::invalidate`] or [`LyricsCache::clear`] is
/// called. There is no eviction.
///
/// Concurrent first-time lookups for the same key are not deduplicated: both
/// may reach the network and the last insert wins.
#[derive(Debug, Default)]
pub struct LyricsCache {
    entries: DashMap<CacheKey, LyricsLookup>,
}

impl LyricsCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached outcome for `(source, query)`, or `None` on a miss
    #[must_use]
    pub fn get(&self, source: &str, query: &str) -> Option<LyricsLookup> {
        self.entries
            .get(&CacheKey::new(source, query))
            .map(|entry| entry.value().clone())
    }

    /// Store an outcome, replacing any previous one
    pub fn insert(&self, source: &str, query: &str, lookup: LyricsLookup) {
        debug!(
            target: LOG_TARGET,
            "Caching {} for '{}' from {}",
            if lookup.is_found() { "lyrics" } else { "miss" },
            query,
            source
        );
        self.entries.insert(CacheKey::new(source, query), lookup);
    }

    /// Forget the outcome for `(source, query)` so the next lookup fetches again.
    /// Returns the removed outcome.
    pub fn invalidate(&self, source: &str, query: &str) -> Option<LyricsLookup> {
        self.entries
            .remove(&CacheKey::new(source, query))
            .map(|(_, lookup)| lookup)
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
