//! Source configuration records and the resolver that builds them.

use crate::config::SourcesConfig;
use crate::error::{CoreError, Result};
use crate::fetcher::FetchMode;
use scraper::Selector;
use serde::Deserialize;

/// Substitution slot for the query in a search URL template
pub const QUERY_PLACEHOLDER: &str = "%s";

/// Fully validated configuration for one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    /// Search page URL with one [`QUERY_PLACEHOLDER`] slot
    pub search_url_template: String,
    /// Search endpoint returns JSON instead of HTML
    pub search_is_json: bool,
    /// Locates the result on the search page
    pub result_selector: String,
    pub title_selector: String,
    pub author_selector: String,
    pub content_selector: String,
}

impl SourceConfig {
    /// Search URL for a query. The query is percent-encoded before substitution.
    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        self.search_url_template
            .replacen(QUERY_PLACEHOLDER, &urlencoding::encode(query), 1)
    }

    /// How the search page should be fetched and parsed
    #[must_use]
    pub const fn search_mode(&self) -> FetchMode {
        if self.search_is_json {
            FetchMode::Json
        } else {
            FetchMode::Html
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSource {
    search: RawSearch,
    parse: RawParse,
}

#[derive(Debug, Deserialize)]
struct RawSearch {
    url: String,
    json: bool,
    select: String,
}

#[derive(Debug, Deserialize)]
struct RawParse {
    title: String,
    author: String,
    content: String,
}

/// Maps source names to [`SourceConfig`] records.
///
/// Resolution is synchronous and never touches the network, so a bad source
/// name is reported before any work is scheduled.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    sources: SourcesConfig,
}

impl SourceResolver {
    #[must_use]
    pub const fn new(sources: SourcesConfig) -> Self {
        Self { sources }
    }

    /// Build the configuration for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownSource`] if the source is not configured,
    /// a required field is missing or has the wrong type, a selector is empty
    /// or not valid CSS, or the URL template does not have exactly one `%s`.
    pub fn resolve(&self, name: &str) -> Result<SourceConfig> {
        let value = self
            .sources
            .get(name)
            .ok_or_else(|| CoreError::unknown_source(name, "no such source in config"))?;

        let raw: RawSource = value
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| CoreError::unknown_source(name, e.message()))?;

        let slots = raw.search.url.matches(QUERY_PLACEHOLDER).count();
        if slots != 1 {
            return Err(CoreError::unknown_source(
                name,
                format!("search.url must contain exactly one '{QUERY_PLACEHOLDER}', found {slots}"),
            ));
        }

        let result_selector = checked_selector(name, "search.select", raw.search.select)?;
        let title_selector = checked_selector(name, "parse.title", raw.parse.title)?;
        let author_selector = checked_selector(name, "parse.author", raw.parse.author)?;
        let content_selector = checked_selector(name, "parse.content", raw.parse.content)?;

        Ok(SourceConfig {
            name: name.to_string(),
            search_url_template: raw.search.url,
            search_is_json: raw.search.json,
            result_selector,
            title_selector,
            author_selector,
            content_selector,
        })
    }

    /// Configured source names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.names()
    }
}

fn checked_selector(source: &str, field: &str, selector: String) -> Result<String> {
    if selector.trim().is_empty() {
        return Err(CoreError::unknown_source(source, format!("{field} is empty")));
    }
    Selector::parse(&selector).map_err(|e| {
        CoreError::unknown_source(source, format!("{field} is not a valid selector: {e}"))
    })?;
    Ok(selector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn resolver(toml: &str) -> SourceResolver {
        SourceResolver::new(Settings::from_toml_str(toml).unwrap().sources)
    }

    const VALID: &str = r#"
        [sources.Example]
        search.url = "https://example.com/search?q=%s"
        search.json = false
        search.select = "a.result"
        parse.title = "h1"
        parse.author = "h2"
        parse.content = "div.lyrics"
    "#;

    fn reason(err: CoreError) -> String {
        match err {
            CoreError::UnknownSource { reason, .. } => reason,
            other => panic!("expected UnknownSource, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_valid_source() {
        let config = resolver(VALID).resolve("Example").unwrap();
        assert_eq!(config.name, "Example");
        assert!(!config.search_is_json);
        assert_eq!(config.search_mode(), FetchMode::Html);
        assert_eq!(config.result_selector, "a.result");
        assert_eq!(config.content_selector, "div.lyrics");
    }

    #[test]
    fn test_unknown_source() {
        let err = resolver(VALID).resolve("unknown-source-xyz").unwrap_err();
        assert!(matches!(err, CoreError::UnknownSource { ref name, .. } if name == "unknown-source-xyz"));
    }

    #[test]
    fn test_search_url_encodes_query() {
        let config = resolver(VALID).resolve("Example").unwrap();
        assert_eq!(
            config.search_url("smooth criminal & more"),
            "https://example.com/search?q=smooth%20criminal%20%26%20more"
        );
    }

    #[test]
    fn test_missing_selector_rejected() {
        let err = resolver(
            r#"
            [sources.Example]
            search.url = "https://example.com/search?q=%s"
            search.json = false
            search.select = "a.result"
            parse.title = "h1"
            parse.content = "div.lyrics"
            "#,
        )
        .resolve("Example")
        .unwrap_err();
        assert!(reason(err).contains("author"));
    }

    #[test]
    fn test_non_boolean_json_flag_rejected() {
        let err = resolver(
            r#"
            [sources.Example]
            search.url = "https://example.com/search?q=%s"
            search.json = "yes"
            search.select = "a.result"
            parse.title = "h1"
            parse.author = "h2"
            parse.content = "div.lyrics"
            "#,
        )
        .resolve("Example")
        .unwrap_err();
        assert!(matches!(err, CoreError::UnknownSource { .. }));
    }

    #[test]
    fn test_empty_selector_rejected() {
        let toml = VALID.replace("\"h2\"", "\"  \"");
        let err = resolver(&toml).resolve("Example").unwrap_err();
        assert!(reason(err).contains("parse.author is empty"));
    }

    #[test]
    fn test_invalid_css_rejected() {
        let toml = VALID.replace("\"a.result\"", "\"a[href\"");
        let err = resolver(&toml).resolve("Example").unwrap_err();
        assert!(reason(err).contains("search.select"));
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let toml = VALID.replace("?q=%s", "?q=");
        let err = resolver(&toml).resolve("Example").unwrap_err();
        assert!(reason(err).contains("exactly one"));
    }

    #[test]
    fn test_template_with_two_placeholders_rejected() {
        let toml = VALID.replace("?q=%s", "?q=%s&r=%s");
        assert!(resolver(&toml).resolve("Example").is_err());
    }

    #[test]
    fn test_source_not_a_table_rejected() {
        let err = resolver("[sources]\nExample = 3\n").resolve("Example").unwrap_err();
        assert!(matches!(err, CoreError::UnknownSource { .. }));
    }

    #[test]
    fn test_builtin_sources_resolve() {
        let settings = Settings::builtin().unwrap();
        let resolver = SourceResolver::new(settings.sources);
        for name in ["A-Z Lyrics", "Genius", "MusicMatch", "LyricsFreak"] {
            assert!(resolver.resolve(name).is_ok(), "{name} should resolve");
        }
        assert!(resolver.resolve("Genius").unwrap().search_is_json);
    }

    #[test]
    fn test_resolve_source_added_in_code() {
        let table: toml::Table = toml::from_str(
            r#"
            search.url = "https://api.example.com/find/%s"
            search.json = true
            search.select = "hits > url"
            parse.title = "h1"
            parse.author = "h2"
            parse.content = "pre"
            "#,
        )
        .unwrap();

        let mut sources = Settings::builtin().unwrap().sources;
        sources.insert("Custom", toml::Value::Table(table));
        let resolver = SourceResolver::new(sources);

        let config = resolver.resolve("Custom").unwrap();
        assert_eq!(config.search_mode(), FetchMode::Json);
        assert_eq!(config.search_url("a b"), "https://api.example.com/find/a%20b");
        assert!(resolver.names().any(|name| name == "Custom"));
    }

    #[test]
    fn test_inserted_source_replaces_existing() {
        let mut sources = Settings::from_toml_str(VALID).unwrap().sources;
        sources.insert("Example", toml::Value::Integer(3));
        assert_eq!(sources.len(), 1);
        assert!(SourceResolver::new(sources).resolve("Example").is_err());
    }
}
