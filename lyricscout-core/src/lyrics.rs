use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lyrics scraped from a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lyrics {
    title: String,
    author: String,
    content: String,
    url: String,
    source: String,
}

impl Lyrics {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            content: content.into(),
            url: url.into(),
            source: source.into(),
        }
    }

    /// The title of the song
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The author/artist of the song
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// The lyrics as plain text, one line per `\n`
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Absolute URL of the page the lyrics were read from
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Name of the configured source that produced these lyrics
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Outcome of a lookup.
///
/// `NotFound` covers every failure below the configuration layer: the song
/// is not on the site, the site is unreachable, or the page could not be
/// parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsLookup {
    Found(Arc<Lyrics>),
    NotFound,
}

impl LyricsLookup {
    /// Check if lyrics were found
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Borrow the lyrics if found
    #[must_use]
    pub fn lyrics(&self) -> Option<&Lyrics> {
        match self {
            Self::Found(lyrics) => Some(lyrics),
            Self::NotFound => None,
        }
    }

    /// Take the shared lyrics if found
    #[must_use]
    pub fn into_lyrics(self) -> Option<Arc<Lyrics>> {
        match self {
            Self::Found(lyrics) => Some(lyrics),
            Self::NotFound => None,
        }
    }
}

impl From<Option<Lyrics>> for LyricsLookup {
    fn from(value: Option<Lyrics>) -> Self {
        value.map_or(Self::NotFound, |lyrics| Self::Found(Arc::new(lyrics)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Lyrics {
        Lyrics::new(
            "Lights",
            "Ellie Goulding",
            "line one\nline two",
            "https://example.com/lights",
            "Example",
        )
    }

    #[test]
    fn test_accessors() {
        let lyrics = sample();
        assert_eq!(lyrics.title(), "Lights");
        assert_eq!(lyrics.author(), "Ellie Goulding");
        assert_eq!(lyrics.content(), "line one\nline two");
        assert_eq!(lyrics.url(), "https://example.com/lights");
        assert_eq!(lyrics.source(), "Example");
    }

    #[test]
    fn test_lookup_from_option() {
        assert!(LyricsLookup::from(Some(sample())).is_found());
        assert_eq!(LyricsLookup::from(None), LyricsLookup::NotFound);
    }

    #[test]
    fn test_lookup_lyrics() {
        let found = LyricsLookup::from(Some(sample()));
        assert_eq!(found.lyrics().map(Lyrics::title), Some("Lights"));
        assert!(LyricsLookup::NotFound.lyrics().is_none());
        assert!(LyricsLookup::NotFound.into_lyrics().is_none());
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["title"], "Lights");
        assert_eq!(json["source"], "Example");
    }
}
