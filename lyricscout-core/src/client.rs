//! Public entry point for lyrics lookups.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::cache::LyricsCache;
use crate::config::Settings;
use crate::error::{CoreError, Result};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::lyrics::LyricsLookup;
use crate::pipeline::ScrapePipeline;
use crate::source::SourceResolver;

const LOG_TARGET: &str = "lyricscout::client";

/// Looks up lyrics from configured sources.
///
/// Lookups are memoized per `(source, query)`, including lookups that found
/// nothing. Use [`LyricsClient::cache`] to invalidate an entry before retrying.
///
/// ```no_run
/// # async fn example() -> Result<(), lyricscout_core::CoreError> {
/// use lyricscout_core::{LyricsClient, Settings};
///
/// let client = LyricsClient::new(Settings::builtin()?)?;
/// if let Some(lyrics) = client.get_lyrics("smooth criminal")?.await.lyrics() {
///     println!("{} by {}\n\n{}", lyrics.title(), lyrics.author(), lyrics.content());
/// }
/// # Ok(())
/// # }
/// ```
pub struct LyricsClient {
    default_source: String,
    resolver: SourceResolver,
    cache: Arc<LyricsCache>,
    pipeline: Arc<ScrapePipeline>,
    runtime: Handle,
}

impl LyricsClient {
    /// Create a client using the configured default source, an HTTP fetcher
    /// built from `settings`, and the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoRuntime`] outside a tokio runtime, or an error
    /// if the HTTP client cannot be created.
    pub fn new(settings: Settings) -> Result<Self> {
        Self::builder(settings).build()
    }

    #[must_use]
    pub fn builder(settings: Settings) -> LyricsClientBuilder {
        LyricsClientBuilder::new(settings)
    }

    /// Source used by [`LyricsClient::get_lyrics`]
    #[must_use]
    pub fn default_source(&self) -> &str {
        &self.default_source
    }

    /// Configured source names
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.resolver.names()
    }

    /// The shared result cache
    #[must_use]
    pub fn cache(&self) -> &Arc<LyricsCache> {
        &self.cache
    }

    /// Look up `query` on the default source.
    ///
    /// # Errors
    ///
    /// See [`LyricsClient::get_lyrics_from`].
    pub fn get_lyrics(&self, query: &str) -> Result<LyricsHandle> {
        self.get_lyrics_from(query, &self.default_source)
    }

    /// Look up `query` on `source`.
    ///
    /// A cached outcome is returned as an already-completed handle without
    /// touching the network. Otherwise the scrape is spawned on the client's
    /// runtime. Dropping the handle does not stop the scrape.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownSource`] immediately, before anything is
    /// spawned, if `source` is not configured or its configuration is invalid.
    pub fn get_lyrics_from(&self, query: &str, source: &str) -> Result<LyricsHandle> {
        if let Some(cached) = self.cache.get(source, query) {
            debug!(target: LOG_TARGET, "Cache hit for '{}' on {}", query, source);
            return Ok(LyricsHandle::ready(cached));
        }

        let config = self.resolver.resolve(source)?;
        info!(target: LOG_TARGET, "Fetching lyrics for '{}' from {}", query, source);

        let pipeline = Arc::clone(&self.pipeline);
        let query = query.to_string();
        let task = self
            .runtime
            .spawn(async move { pipeline.run(&config, &query).await });

        Ok(LyricsHandle::pending(task))
    }
}

/// Builder for [`LyricsClient`]
pub struct LyricsClientBuilder {
    settings: Settings,
    default_source: Option<String>,
    runtime: Option<Handle>,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl LyricsClientBuilder {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            default_source: None,
            runtime: None,
            fetcher: None,
        }
    }

    /// Override the configured default source
    #[must_use]
    pub fn default_source(mut self, source: impl Into<String>) -> Self {
        self.default_source = Some(source.into());
        self
    }

    /// Runtime that scrapes are spawned on
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Replace the HTTP transport
    #[must_use]
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoRuntime`] when no runtime was given and none is
    /// current, or an error if the HTTP client cannot be created.
    pub fn build(self) -> Result<LyricsClient> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| CoreError::NoRuntime)?,
        };

        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::from_config(&self.settings.lyrics)?),
        };

        let cache = Arc::new(LyricsCache::new());
        let pipeline = Arc::new(ScrapePipeline::new(fetcher, Arc::clone(&cache)));
        let default_source = self
            .default_source
            .unwrap_or(self.settings.lyrics.default);

        Ok(LyricsClient {
            default_source,
            resolver: SourceResolver::new(self.settings.sources),
            cache,
            pipeline,
            runtime,
        })
    }
}

/// Pending or completed lookup. Resolves exactly once.
#[must_use = "a lyrics handle does nothing unless awaited"]
pub struct LyricsHandle {
    state: HandleState,
}

enum HandleState {
    Ready(Option<LyricsLookup>),
    Pending(JoinHandle<LyricsLookup>),
}

impl LyricsHandle {
    fn ready(lookup: LyricsLookup) -> Self {
        Self {
            state: HandleState::Ready(Some(lookup)),
        }
    }

    fn pending(task: JoinHandle<LyricsLookup>) -> Self {
        Self {
            state: HandleState::Pending(task),
        }
    }

    /// Whether the outcome came straight from the cache
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self.state, HandleState::Ready(_))
    }
}

impl Future for LyricsHandle {
    type Output = LyricsLookup;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            HandleState::Ready(lookup) => {
                Poll::Ready(lookup.take().unwrap_or(LyricsLookup::NotFound))
            }
            HandleState::Pending(task) => match Pin::new(task).poll(cx) {
                Poll::Ready(Ok(lookup)) => Poll::Ready(lookup),
                Poll::Ready(Err(e)) => {
                    error!(target: LOG_TARGET, "Lyrics lookup task failed: {}", e);
                    Poll::Ready(LyricsLookup::NotFound)
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }
}
