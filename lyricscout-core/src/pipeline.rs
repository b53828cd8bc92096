//! Two-step scrape shared by every source.
//!
//! 1. Fetch the search page built from the source's URL template.
//! 2. Locate the lyrics page URL with the result selector.
//! 3. Fetch the lyrics page and extract title, author and content.
//!
//! The same code runs for every source; only the [`SourceConfig`] differs.
//! Fetch and parse failures are logged and reported as
//! [`LyricsLookup::NotFound`].

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::LyricsCache;
use crate::document::{element_text, Document};
use crate::fetcher::{FetchError, FetchMode, Fetcher, Page};
use crate::lyrics::{Lyrics, LyricsLookup};
use crate::sanitize::html_to_text;
use crate::source::SourceConfig;

const LOG_TARGET: &str = "lyricscout::pipeline";

/// Runs scrapes against resolved sources and records outcomes in the cache
pub struct ScrapePipeline {
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<LyricsCache>,
}

impl ScrapePipeline {
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, cache: Arc<LyricsCache>) -> Self {
        Self { fetcher, cache }
    }

    /// Scrape `query` from `source` and cache the outcome, found or not
    pub async fn run(&self, source: &SourceConfig, query: &str) -> LyricsLookup {
        let lookup = self.scrape(source, query).await;
        self.cache.insert(&source.name, query, lookup.clone());
        lookup
    }

    /// Scrape without reading or writing the cache
    pub async fn scrape(&self, source: &SourceConfig, query: &str) -> LyricsLookup {
        info!(target: LOG_TARGET, "Searching {} for '{}'", source.name, query);

        match self.try_scrape(source, query).await {
            Ok(Some(lyrics)) => {
                info!(
                    target: LOG_TARGET,
                    "Found '{}' by {} on {} ({})",
                    lyrics.title(),
                    lyrics.author(),
                    source.name,
                    lyrics.url()
                );
                LyricsLookup::from(Some(lyrics))
            }
            Ok(None) => {
                info!(target: LOG_TARGET, "No lyrics for '{}' on {}", query, source.name);
                LyricsLookup::NotFound
            }
            Err(e) => {
                warn!(
                    target: LOG_TARGET,
                    "Lookup of '{}' on {} failed: {}", query, source.name, e
                );
                LyricsLookup::NotFound
            }
        }
    }

    async fn try_scrape(
        &self,
        source: &SourceConfig,
        query: &str,
    ) -> Result<Option<Lyrics>, FetchError> {
        let search_url = source.search_url(query);
        debug!(target: LOG_TARGET, "Search URL: {}", search_url);

        let search_page = self.fetcher.fetch(&search_url, source.search_mode()).await?;
        let Some(lyrics_url) = locate_lyrics_url(&search_page, source)? else {
            debug!(
                target: LOG_TARGET,
                "Result selector '{}' matched nothing usable", source.result_selector
            );
            return Ok(None);
        };

        debug!(target: LOG_TARGET, "Lyrics URL: {}", lyrics_url);
        let lyrics_page = self.fetcher.fetch(&lyrics_url, FetchMode::Html).await?;

        Ok(extract_lyrics(&lyrics_page, &lyrics_url, source))
    }
}

/// Find the lyrics page URL on a search page.
///
/// JSON search results use the node's text, HTML results use its `href`
/// resolved against the search page URL.
fn locate_lyrics_url(page: &Page, source: &SourceConfig) -> Result<Option<String>, FetchError> {
    let document = Document::from_page(page, source.search_mode())?;
    let Some(node) = document.select_first(&source.result_selector) else {
        return Ok(None);
    };

    let url = if source.search_is_json {
        Some(element_text(node))
    } else {
        document.absolute_href(node)
    };

    Ok(url.filter(|url| !url.is_empty()))
}

/// Pull title, author and content from a lyrics page.
///
/// Any missing or empty field means no result; partial lyrics are never returned.
fn extract_lyrics(page: &Page, url: &str, source: &SourceConfig) -> Option<Lyrics> {
    let document = Document::parse_html(&page.body, &page.url);

    let field = |selector: &str, name: &str| {
        let node = document.select_first(selector);
        if node.is_none() {
            debug!(target: LOG_TARGET, "No {} matching '{}' at {}", name, selector, url);
        }
        node
    };

    let title = element_text(field(&source.title_selector, "title")?);
    let author = element_text(field(&source.author_selector, "author")?);
    let content = html_to_text(&field(&source.content_selector, "content")?.inner_html());

    if title.is_empty() || author.is_empty() || content.is_empty() {
        debug!(target: LOG_TARGET, "Empty title, author or content at {}", url);
        return None;
    }

    Some(Lyrics::new(title, author, content, url, source.name.as_str()))
}
