pub mod cache;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod fetcher;
pub mod lyrics;
pub mod paths;
pub mod pipeline;
pub mod sanitize;
pub mod source;

pub use cache::{CacheKey, LyricsCache};
pub use client::{LyricsClient, LyricsClientBuilder, LyricsHandle};
pub use config::{
    LyricsConfig, Settings, SourcesConfig, CONFIG_TEMPLATE, DEFAULT_SOURCE, DEFAULT_TIMEOUT_MS,
    DEFAULT_USER_AGENT,
};
pub use error::CoreError;
pub use fetcher::{FetchError, FetchMode, Fetcher, HttpFetcher, Page};
pub use lyrics::{Lyrics, LyricsLookup};
pub use paths::{config_dir, config_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use pipeline::ScrapePipeline;
pub use source::{SourceConfig, SourceResolver, QUERY_PLACEHOLDER};

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
