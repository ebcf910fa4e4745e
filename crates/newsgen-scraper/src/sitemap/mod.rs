//! News-article discovery through `robots.txt` and XML sitemaps.
//!
//! Traversal is an explicit worklist of `(url, remaining_depth)` entries.
//! Root sitemaps start with depth 1, so a sitemap index is expanded exactly
//! one level and indexes nested inside it are ignored. Every per-document
//! failure is logged and skipped; a crawl never errors.

mod document;
mod news_set;
mod robots;

use std::collections::VecDeque;
use std::time::Duration;

use crate::fetch::{FallbackTransport, FetchOptions, ResilientFetcher};

pub use document::{SitemapDocument, SitemapKind};
pub use news_set::{is_news_url, NewsUrlSet};

use robots::{dedup_preserving_order, parse_robots_sitemaps};

/// Depth granted to sitemaps discovered from `robots.txt`.
const ROOT_DEPTH: u8 = 1;

/// Site-specific crawl settings.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Scheme and host, e.g. `https://www.muiv.ru`.
    pub base_url: String,
    /// Path of the news section, e.g. `/about/news/`.
    pub news_path: String,
    pub fetch_timeout: Duration,
    /// Pause before each child sitemap fetched from an index.
    pub child_delay: Duration,
    pub allow_fallback: bool,
}

impl SiteConfig {
    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    #[must_use]
    pub fn robots_url(&self) -> String {
        format!("{}/robots.txt", self.base())
    }

    #[must_use]
    pub fn default_sitemap_url(&self) -> String {
        format!("{}/sitemap.xml", self.base())
    }

    /// Absolute URL prefix every news article starts with.
    #[must_use]
    pub fn news_prefix(&self) -> String {
        let path = self.news_path.trim_start_matches('/');
        format!("{}/{path}", self.base())
    }
}

/// Result of one crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Sorted, deduplicated article URLs.
    pub urls: Vec<String>,
    /// Sitemap documents that parsed as `urlset` or `sitemapindex`.
    pub documents: usize,
    /// Candidates that contributed nothing: unreachable, bad status, empty,
    /// non-XML, unparseable, or an index nested too deep.
    pub skipped: usize,
}

/// Crawls a site's sitemaps for news article URLs.
pub struct SitemapCrawler<'a, T> {
    fetcher: &'a ResilientFetcher<T>,
    site: SiteConfig,
}

impl<'a, T: FallbackTransport + Sync> SitemapCrawler<'a, T> {
    #[must_use]
    pub fn new(fetcher: &'a ResilientFetcher<T>, site: SiteConfig) -> Self {
        Self { fetcher, site }
    }

    fn options(&self, pre_delay: Duration) -> FetchOptions {
        FetchOptions {
            timeout: self.site.fetch_timeout,
            allow_fallback: self.site.allow_fallback,
            pre_delay,
        }
    }

    /// Lists candidate sitemap URLs from `robots.txt`, falling back to
    /// `/sitemap.xml` when it names none or cannot be fetched.
    pub async fn discover_sitemaps(&self) -> Vec<String> {
        let robots_url = self.site.robots_url();
        let found = match self.fetcher.fetch(&robots_url, &self.options(Duration::ZERO)).await {
            Ok(res) if res.is_success() => parse_robots_sitemaps(&res.body, self.site.base()),
            Ok(res) => {
                tracing::debug!(url = %robots_url, status = res.status, "robots.txt not available");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(url = %robots_url, error = %e, "failed fetching robots.txt");
                Vec::new()
            }
        };

        if found.is_empty() {
            tracing::debug!(url = %robots_url, "no sitemap directives — using default sitemap path");
            return vec![self.site.default_sitemap_url()];
        }
        dedup_preserving_order(found)
    }

    /// Collects up to `max_urls` news article URLs, sorted.
    pub async fn collect_news_urls(&self, max_urls: usize) -> Vec<String> {
        self.crawl(max_urls).await.urls
    }

    /// Like [`Self::collect_news_urls`], also reporting how many documents
    /// were used and skipped.
    pub async fn crawl(&self, max_urls: usize) -> CrawlOutcome {
        if max_urls == 0 {
            return CrawlOutcome::default();
        }
        let candidates = self.discover_sitemaps().await;
        self.crawl_candidates(candidates, max_urls).await
    }

    /// Crawls already discovered root sitemaps, in order.
    pub async fn crawl_candidates(&self, candidates: Vec<String>, max_urls: usize) -> CrawlOutcome {
        let mut outcome = CrawlOutcome::default();
        if max_urls == 0 {
            return outcome;
        }

        let prefix = self.site.news_prefix();
        let mut found = NewsUrlSet::new(max_urls);
        let mut worklist: VecDeque<(String, u8)> = candidates
            .into_iter()
            .map(|url| (url, ROOT_DEPTH))
            .collect();

        while let Some((url, depth)) = worklist.pop_front() {
            let pre_delay = if depth < ROOT_DEPTH {
                self.site.child_delay
            } else {
                Duration::ZERO
            };
            let Some(doc) = self.load_document(&url, pre_delay).await else {
                outcome.skipped += 1;
                continue;
            };

            match doc.kind {
                SitemapKind::UrlSet => {
                    outcome.documents += 1;
                    for loc in doc.locs.iter().filter(|loc| is_news_url(loc, &prefix)) {
                        found.insert(loc);
                        if found.is_full() {
                            tracing::info!(url = %url, max_urls, "news URL cap reached — stopping crawl");
                            outcome.urls = found.into_sorted_vec();
                            return outcome;
                        }
                    }
                }
                SitemapKind::SitemapIndex if depth > 0 => {
                    outcome.documents += 1;
                    tracing::debug!(url = %url, children = doc.locs.len(), "expanding sitemap index");
                    // children are visited before the next root candidate, in document order
                    for child in doc.locs.into_iter().rev() {
                        worklist.push_front((child, depth - 1));
                    }
                }
                SitemapKind::SitemapIndex => {
                    tracing::debug!(url = %url, "ignoring nested sitemap index");
                    outcome.skipped += 1;
                }
                SitemapKind::NotSitemap => {
                    tracing::debug!(url = %url, "response is not an XML sitemap — skipping");
                    outcome.skipped += 1;
                }
            }
        }

        outcome.urls = found.into_sorted_vec();
        tracing::info!(
            urls = outcome.urls.len(),
            documents = outcome.documents,
            skipped = outcome.skipped,
            "sitemap crawl finished"
        );
        outcome
    }

    /// Fetches one candidate. `None` for network failures, non-2xx statuses
    /// and empty bodies.
    async fn load_document(&self, url: &str, pre_delay: Duration) -> Option<SitemapDocument> {
        let res = match self.fetcher.fetch(url, &self.options(pre_delay)).await {
            Ok(res) => res,
            Err(e) => {
                tracing::debug!(url, error = %e, "failed fetching sitemap");
                return None;
            }
        };

        if !res.is_success() {
            tracing::debug!(url, status = res.status, "sitemap returned non-success status");
            return None;
        }
        if res.body.is_empty() {
            tracing::debug!(url, "sitemap body is empty");
            return None;
        }

        Some(SitemapDocument::classify(url, res.body))
    }
}
