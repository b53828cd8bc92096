use crate::error::{CoreError, Result};
use const_format::concatcp;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Source used when a lookup does not name one
pub const DEFAULT_SOURCE: &str = "A-Z Lyrics";

/// User agent sent with every request unless overridden
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Per-request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub lyrics: LyricsConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// Process-wide lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LyricsConfig {
    /// Source name used by `get_lyrics` when none is given
    #[serde(default = "default_source")]
    pub default: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            default: default_source(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl LyricsConfig {
    /// Per-request timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Raw per-source tables, keyed by source name.
///
/// Entries stay untyped until they are resolved, so one broken source does
/// not prevent the others from loading. See [`crate::source::SourceResolver`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourcesConfig(toml::Table);

impl SourcesConfig {
    /// Raw configuration value for a source, if the name is present
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&toml::Value> {
        self.0.get(name)
    }

    /// Configured source names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add or replace a raw source table
    pub fn insert(&mut self, name: impl Into<String>, value: toml::Value) {
        self.0.insert(name.into(), value);
    }
}

impl Settings {
    /// Get the config file path (~/.config/lyricscout/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Settings with the built-in source definitions and default `[lyrics]` values.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded template fails to parse.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(CONFIG_TEMPLATE)
    }

    /// Parse settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error on TOML syntax errors or invalid `[lyrics]` values.
    /// Source tables are not validated here.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load config from the default path or create a template on first run
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing the template, or an
    /// error if the config file cannot be read or parsed.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path())
    }

    /// Same as [`Settings::load_or_create`] for an explicit path.
    ///
    /// # Errors
    ///
    /// See [`Settings::load_or_create`].
    pub fn load_or_create_at(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(config_path, CONFIG_TEMPLATE)?;

            return Err(CoreError::ConfigNotFound {
                path: config_path.to_path_buf(),
            });
        }

        Self::load(config_path)
    }

    fn validate(&self) -> Result<()> {
        if self.lyrics.default.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "lyrics.default must not be empty".to_string(),
            });
        }
        if self.lyrics.timeout_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "lyrics.timeout_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Config file written on first run. Also the source of [`Settings::builtin`].
pub const CONFIG_TEMPLATE: &str = concatcp!(
    r#"# lyricscout configuration
# ~/.config/lyricscout/config.toml

[lyrics]
# Source used when none is given on the command line
default = ""#,
    DEFAULT_SOURCE,
    r#""
user_agent = ""#,
    DEFAULT_USER_AGENT,
    r#""
# Timeout applied to every HTTP request
timeout_ms = "#,
    DEFAULT_TIMEOUT_MS,
    r#"

# Each source is a two-step scrape:
#   search.url     search page URL, "%s" is replaced with the encoded query
#   search.json    true when the search endpoint returns JSON; keys become
#                  elements so search.select can address them
#   search.select  CSS selector for the result; its href (HTML) or its
#                  text (JSON) is the lyrics page URL
#   parse.*        CSS selectors for title, author and content on the lyrics page

[sources."A-Z Lyrics"]
search.url = "https://search.azlyrics.com/search.php?q=%s"
search.json = false
search.select = "a[href*='/lyrics/']"
parse.title = "div.ringtone ~ b"
parse.author = "div.lyricsh b"
parse.content = "div.ringtone ~ div"

[sources.Genius]
search.url = "https://genius.com/api/search?q=%s"
search.json = true
search.select = "result > url"
parse.title = "h1[class^='SongHeader']"
parse.author = "a[class^='HeaderArtistAndTracklist']"
parse.content = "div[data-lyrics-container='true']"

[sources.MusicMatch]
search.url = "https://www.musixmatch.com/search/%s"
search.json = false
search.select = "a.title[href*='/lyrics/']"
parse.title = "h1"
parse.author = "h2 span a"
parse.content = "div.mxm-lyrics > span"

[sources.LyricsFreak]
search.url = "https://www.lyricsfreak.com/search.php?q=%s"
search.json = false
search.select = "a.song[href*='/lyrics/']"
parse.title = "div#breadcrumb span > span[itemprop='title']"
parse.author = "h2.lyric-song-head a"
parse.content = "div#content"
"#
);
