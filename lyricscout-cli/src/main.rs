use anyhow::{Context, Result};
use clap::Parser;
use lyricscout_core::{CoreError, Lyrics, LyricsClient, LyricsLookup, Settings};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_TARGET: &str = "lyricscout::cli";

/// Exit code when the lookup ran but found nothing
const EXIT_NOT_FOUND: u8 = 1;
/// Exit code when the requested source is unknown or misconfigured
const EXIT_BAD_SOURCE: u8 = 2;

#[derive(Parser)]
#[command(name = "lyricscout")]
#[command(about = "Look up song lyrics from configured lyrics sites", version)]
struct Cli {
    /// Song to search for, e.g. "michael jackson smooth criminal"
    #[arg(required_unless_present = "list_sources")]
    query: Vec<String>,

    /// Source to search (defaults to lyrics.default in the config)
    #[arg(short, long)]
    source: Option<String>,

    /// Config file (defaults to ~/.config/lyricscout/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// List configured sources and exit
    #[arg(long)]
    list_sources: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref());

    let settings = load_settings(cli.config.as_deref())?;
    let mut builder = LyricsClient::builder(settings);
    if let Some(source) = &cli.source {
        builder = builder.default_source(source.clone());
    }
    let client = builder.build()?;

    if cli.list_sources {
        for name in client.sources() {
            let marker = if name == client.default_source() { " (default)" } else { "" };
            println!("{name}{marker}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let query = cli.query.join(" ");
    info!(target: LOG_TARGET, "Looking up '{}' on {}", query, client.default_source());

    let handle = match client.get_lyrics(&query) {
        Ok(handle) => handle,
        Err(e @ CoreError::UnknownSource { .. }) => {
            eprintln!("{e}");
            return Ok(ExitCode::from(EXIT_BAD_SOURCE));
        }
        Err(e) => return Err(e.into()),
    };

    match handle.await {
        LyricsLookup::Found(lyrics) => {
            print_lyrics(&lyrics, cli.json)?;
            Ok(ExitCode::SUCCESS)
        }
        LyricsLookup::NotFound => {
            eprintln!("No lyrics found for '{query}' on {}", client.default_source());
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        }
    }
}

/// Load settings from an explicit path, or from the default path creating a
/// template on first run.
fn load_settings(path: Option<&Path>) -> Result<Settings> {
    if let Some(path) = path {
        return Settings::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    match Settings::load_or_create() {
        Ok(settings) => Ok(settings),
        Err(CoreError::ConfigNotFound { path }) => {
            eprintln!("Created a default config at {}", path.display());
            Settings::load(&path).context("Failed to load the generated config")
        }
        Err(e) => Err(e).context("Failed to load config"),
    }
}

fn print_lyrics(lyrics: &Lyrics, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(lyrics)?);
        return Ok(());
    }

    println!("{} - {}", lyrics.author(), lyrics.title());
    println!("{} ({})", lyrics.url(), lyrics.source());
    println!();
    println!("{}", lyrics.content());
    Ok(())
}

/// Initialize tracing to stderr and an optional log file
fn init_tracing(log_file: Option<&Path>) {
    // Selector and HTML parser internals are noisy at debug
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,html5ever=warn,selectors=warn"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if let Some(log_path) = log_file {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(stderr_layer)
                    .with(file_layer)
                    .init();

                debug!(target: LOG_TARGET, "Logging to {}", log_path.display());
                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
