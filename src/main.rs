use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use zhcorpus::config::{Config, LogFormat};
use zhcorpus::fetch::{FetchConfig, Fetcher};
use zhcorpus::store::{CorpusStore, SledStore};
use zhcorpus::sync::SyncRunner;

#[derive(Parser)]
#[command(name = "zhcorpus", version, about = "Chinese learning corpus sync")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sync upstream exports into the local store
    Sync {
        /// Sync only this source (cedict, tatoeba/links, tatoeba/<lang>)
        #[arg(long)]
        source: Option<String>,
    },
    /// Show store contents and per-source sync state
    Stats {
        #[arg(long, value_enum, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Write a default config file
    Init {
        /// Where to write it
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatsFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    init_logging(&config, cli.verbose);

    match cli.command {
        Command::Sync { source } => run_sync(&config, source.as_deref()),
        Command::Stats { format } => run_stats(&config, format),
        Command::Init { path } => run_init(&path),
    }
}

fn init_logging(config: &Config, verbose: u8) {
    let level = config.logging.level.raise(verbose);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("zhcorpus={}", level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn open_store(config: &Config) -> Result<SledStore> {
    SledStore::open(&config.data_dir).with_context(|| {
        format!("failed to open store at {}", config.data_dir.display())
    })
}

fn run_sync(config: &Config, source: Option<&str>) -> Result<()> {
    let store = open_store(config)?;
    let fetch_config = FetchConfig {
        timeout: config.sync.timeout_secs.map(std::time::Duration::from_secs),
        ..FetchConfig::default()
    };
    let fetcher = Fetcher::new(&fetch_config)?;
    let runner = SyncRunner::new(&store, fetcher, config.clone());

    match source {
        Some(id) => {
            let outcome = runner.sync_source(id)?;
            info!(source = id, ?outcome, "done");
            Ok(())
        }
        None => {
            let report = runner.sync_all();
            if report.all_ok() {
                Ok(())
            } else {
                let failed: Vec<&str> = report
                    .results
                    .iter()
                    .filter(|r| r.outcome.is_err())
                    .map(|r| r.source_id.as_str())
                    .collect();
                anyhow::bail!("sync failed for: {}", failed.join(", "))
            }
        }
    }
}

fn run_stats(config: &Config, format: StatsFormat) -> Result<()> {
    let store = open_store(config)?;
    let counts = store.counts()?;
    let metas = store.metas()?;

    match format {
        StatsFormat::Json => {
            let value = serde_json::json!({
                "counts": counts,
                "sources": metas,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        StatsFormat::Text => {
            println!("entries:   {}", counts.entries);
            println!("links:     {}", counts.links);
            println!("sentences: {}", counts.sentences);
            if !metas.is_empty() {
                println!();
                for meta in metas {
                    println!("{}\tlast updated {}", meta.source_id, meta.last_updated);
                }
            }
        }
    }
    Ok(())
}

fn run_init(path: &PathBuf) -> Result<()> {
    if path.exists() {
        anyhow::bail!("refusing to overwrite existing file {}", path.display());
    }
    std::fs::write(path, Config::default_toml()?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("wrote default config to {}", path.display());
    Ok(())
}
