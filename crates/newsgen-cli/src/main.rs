use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod harvest;
mod output;
mod site;

#[derive(Debug, Parser)]
#[command(name = "newsgen")]
#[command(about = "Collects real events and builds plan -> news training pairs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download events from the events API and write them as JSONL
    Harvest(HarvestArgs),
    /// Discover the site's sitemaps and list news article URLs
    Sitemap {
        /// Stop after this many news URLs
        #[arg(long)]
        max_urls: Option<usize>,
    },
    /// Walk the paginated news listing and print the article links
    NewsIndex {
        /// Number of listing pages to walk
        #[arg(long)]
        pages: Option<u32>,
    },
    /// Fetch one page and print what came back
    Fetch {
        url: String,
        /// Write the response body to this file
        #[arg(long)]
        save: Option<PathBuf>,
        /// Return anti-bot pages as they are instead of retrying them
        #[arg(long)]
        no_fallback: bool,
    },
}

/// Overrides for the configured harvest settings.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct HarvestArgs {
    /// Location code: msk, spb, ekb, ...
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Number of pages to request
    #[arg(long)]
    pub(crate) pages: Option<u32>,
    /// Events per page (the API allows up to 100)
    #[arg(long)]
    pub(crate) page_size: Option<u32>,
    #[arg(long)]
    pub(crate) lang: Option<String>,
    /// Also write plan -> news pairs
    #[arg(long)]
    pub(crate) make_pairs: bool,
    /// Output directory; `raw/` and `processed/` are created inside it
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = newsgen_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Harvest(args) => harvest::run_harvest(&config, args).await,
        Commands::Sitemap { max_urls } => site::run_sitemap(&config, max_urls).await,
        Commands::NewsIndex { pages } => site::run_news_index(&config, pages).await,
        Commands::Fetch {
            url,
            save,
            no_fallback,
        } => site::run_fetch(&config, &url, save.as_deref(), no_fallback).await,
    }
}
