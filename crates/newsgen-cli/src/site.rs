//! `newsgen sitemap`, `newsgen news-index` and `newsgen fetch`: news-site
//! diagnostics.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use newsgen_core::AppConfig;
use newsgen_scraper::{
    FetchOptions, NewsIndexScraper, NewsItem, ResilientFetcher, SiteConfig, SitemapCrawler,
};

/// Characters of the body shown by `fetch`.
const BODY_PREVIEW_CHARS: usize = 250;

/// How many collected URLs `sitemap` prints.
const URL_PREVIEW: usize = 10;

pub(crate) fn site_config(config: &AppConfig) -> SiteConfig {
    SiteConfig {
        base_url: config.site_base_url.clone(),
        news_path: config.news_path.clone(),
        fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
        child_delay: Duration::from_millis(config.sitemap_child_delay_ms),
        allow_fallback: config.fallback_enabled,
    }
}

fn build_fetcher(config: &AppConfig) -> anyhow::Result<ResilientFetcher> {
    let fetcher = if config.fallback_enabled {
        ResilientFetcher::new(&config.user_agent)
    } else {
        ResilientFetcher::without_fallback(&config.user_agent)
    };
    fetcher.context("failed to build page fetcher")
}

/// Prints the discovered sitemaps and the news URLs collected from them.
///
/// # Errors
///
/// Returns an error only if the fetcher cannot be constructed; crawl
/// failures are logged and counted.
pub(crate) async fn run_sitemap(config: &AppConfig, max_urls: Option<usize>) -> anyhow::Result<()> {
    let fetcher = build_fetcher(config)?;
    let crawler = SitemapCrawler::new(&fetcher, site_config(config));
    let max_urls = max_urls.unwrap_or(config.max_sitemap_urls);

    let sitemaps = crawler.discover_sitemaps().await;
    println!("sitemaps:");
    for sitemap in &sitemaps {
        println!(" - {sitemap}");
    }

    let outcome = crawler.crawl_candidates(sitemaps, max_urls).await;
    println!();
    println!(
        "news_urls: {} (documents: {}, skipped: {})",
        outcome.urls.len(),
        outcome.documents,
        outcome.skipped
    );
    for url in outcome.urls.iter().take(URL_PREVIEW) {
        println!("{url}");
    }
    Ok(())
}

/// Prints every article link found on the first `pages` listing pages.
///
/// # Errors
///
/// Returns an error only if the fetcher cannot be constructed.
pub(crate) async fn run_news_index(
    config: &AppConfig,
    pages: Option<u32>,
) -> anyhow::Result<()> {
    let fetcher = build_fetcher(config)?;
    let scraper = NewsIndexScraper::new(&fetcher, site_config(config))
        .with_page_delay(Duration::from_millis(config.news_index_delay_ms));
    let pages = pages.unwrap_or(config.news_index_pages);

    let items = scraper.collect(pages).await;
    println!("news_items: {}", items.len());
    for item in &items {
        println!("{}", news_item_line(item));
    }
    Ok(())
}

/// `date<TAB>url<TAB>title`, with `-` for an unknown date.
pub(crate) fn news_item_line(item: &NewsItem) -> String {
    let date = item
        .date
        .map_or_else(|| "-".to_owned(), |d| d.format("%Y-%m-%d").to_string());
    format!("{date}\t{}\t{}", item.url, item.title)
}

/// Fetches `url` once and prints the diagnostic summary.
///
/// # Errors
///
/// Returns an error if the page is unreachable or `save` cannot be written.
pub(crate) async fn run_fetch(
    config: &AppConfig,
    url: &str,
    save: Option<&Path>,
    no_fallback: bool,
) -> anyhow::Result<()> {
    let fetcher = build_fetcher(config)?;
    let options = FetchOptions {
        timeout: Duration::from_secs(config.fetch_timeout_secs),
        allow_fallback: !no_fallback,
        pre_delay: Duration::ZERO,
    };
    let result = fetcher.fetch(url, &options).await?;

    println!("status: {}", result.status);
    println!("final_url: {}", result.final_url);
    println!("content_type: {}", result.content_type);
    println!("fallback_used: {}", result.fallback_used);
    println!("looks_like_antibot: {}", result.antibot);

    if let Some(path) = save {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(path, &result.body)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("saved: {}", path.display());
    }

    println!("head({BODY_PREVIEW_CHARS}):");
    println!("{}", body_preview(&result.body));
    Ok(())
}

fn body_preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
