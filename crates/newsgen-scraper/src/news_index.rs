//! News discovery by walking the paginated news listing.
//!
//! The listing at `{news_prefix}` is split into pages addressed as
//! `?PAGEN_1=N`. Every page is an HTML document whose anchors point at
//! articles; the publication date sits next to the anchor as `dd.mm.yyyy`.
//! Requesting a page past the end returns the last page again, so a page
//! that adds nothing new ends the walk.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::fetch::{FallbackTransport, FetchOptions, ResilientFetcher};
use crate::sitemap::{is_news_url, SiteConfig};

/// Anchors shorter than this (in characters) are pagers or icons.
const MIN_TITLE_CHARS: usize = 5;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2})\.(\d{2})\.(\d{4})").expect("valid regex"));

/// One article link found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub url: String,
    /// Anchor text with whitespace collapsed.
    pub title: String,
    /// First `dd.mm.yyyy` in the text around the anchor, if it is a real date.
    pub date: Option<NaiveDate>,
}

/// Extracts article links from one listing page.
///
/// Hrefs are resolved against `page_url`, kept only when they fall inside
/// the news section rooted at `prefix`, and deduplicated by URL keeping the
/// first occurrence. Links carrying a query string are pagination, not
/// articles.
#[must_use]
pub fn parse_index_page(html: &str, page_url: &Url, prefix: &str) -> Vec<NewsItem> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").expect("valid selector");

    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for anchor in document.select(&anchors) {
        let Some(url) = article_url(anchor, page_url, prefix) else {
            continue;
        };
        let title = collapse_text(anchor);
        if title.chars().count() < MIN_TITLE_CHARS {
            continue;
        }
        if !seen.insert(url.clone()) {
            continue;
        }
        let date = anchor
            .parent()
            .and_then(ElementRef::wrap)
            .and_then(|parent| find_date(&collapse_text(parent)));
        items.push(NewsItem { url, title, date });
    }
    items
}

fn article_url(anchor: ElementRef<'_>, page_url: &Url, prefix: &str) -> Option<String> {
    let href = anchor.value().attr("href")?.trim();
    let mut url = page_url.join(href).ok()?;
    if url.query().is_some() {
        return None;
    }
    url.set_fragment(None);
    let url = url.to_string();
    is_news_url(&url, prefix).then_some(url)
}

fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn find_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(text)?;
    let day = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Walks the news listing pages and collects article links.
pub struct NewsIndexScraper<'a, T> {
    fetcher: &'a ResilientFetcher<T>,
    site: SiteConfig,
    page_delay: Duration,
}

impl<'a, T: FallbackTransport + Sync> NewsIndexScraper<'a, T> {
    #[must_use]
    pub fn new(fetcher: &'a ResilientFetcher<T>, site: SiteConfig) -> Self {
        Self {
            fetcher,
            site,
            page_delay: Duration::ZERO,
        }
    }

    /// Pause before every page after the first.
    #[must_use]
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// URL of listing page `page` (1-based). Page 1 is the bare index.
    #[must_use]
    pub fn page_url(&self, page: u32) -> String {
        let prefix = self.site.news_prefix();
        if page <= 1 {
            prefix
        } else {
            format!("{prefix}?PAGEN_1={page}")
        }
    }

    /// Collects items from up to `max_pages` listing pages, in page order.
    ///
    /// Unreachable pages, non-2xx statuses and anti-bot pages are logged and
    /// skipped. The walk stops early at the first page that adds no new URL.
    pub async fn collect(&self, max_pages: u32) -> Vec<NewsItem> {
        let prefix = self.site.news_prefix();
        let mut seen = HashSet::new();
        let mut items = Vec::new();

        for page in 1..=max_pages {
            let Some(found) = self.scrape_page(page, &prefix).await else {
                continue;
            };
            let before = items.len();
            for item in found {
                if seen.insert(item.url.clone()) {
                    items.push(item);
                }
            }
            if items.len() == before {
                tracing::debug!(page, "listing page added nothing new — stopping");
                break;
            }
        }

        tracing::info!(items = items.len(), "news index walk finished");
        items
    }

    async fn scrape_page(&self, page: u32, prefix: &str) -> Option<Vec<NewsItem>> {
        let url = self.page_url(page);
        let options = FetchOptions {
            timeout: self.site.fetch_timeout,
            allow_fallback: self.site.allow_fallback,
            pre_delay: if page > 1 { self.page_delay } else { Duration::ZERO },
        };

        let res = match self.fetcher.fetch(&url, &options).await {
            Ok(res) => res,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "failed fetching news listing page");
                return None;
            }
        };
        if !res.is_success() {
            tracing::warn!(url = %url, status = res.status, "news listing page returned an error status");
            return None;
        }
        if res.antibot {
            tracing::warn!(url = %url, fallback_used = res.fallback_used, "news listing page is an anti-bot interstitial");
            return None;
        }

        let base = match Url::parse(&res.final_url) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!(url = %res.final_url, error = %e, "unparseable final URL");
                return None;
            }
        };
        let found = parse_index_page(&res.body, &base, prefix);
        tracing::debug!(url = %url, items = found.len(), "parsed news listing page");
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "https://www.muiv.ru/about/news/";

    fn page_url() -> Url {
        Url::parse(PREFIX).unwrap()
    }

    const LISTING: &str = r#"<html><body>
<div class="news-list">
  <div class="news-item">
    <a href="/about/news/den-otkrytykh-dverey/"><img src="/upload/a.jpg"></a>
    <span class="date">14.03.2025</span>
    <a href="/about/news/den-otkrytykh-dverey/">День   открытых
       дверей</a>
  </div>
  <div class="news-item">
    <span>02.03.2025</span> <a href="https://www.muiv.ru/about/news/olimpiada/#top">Олимпиада школьников</a>
  </div>
  <div class="news-item"><a href="/about/news/bez-daty/">Новость без даты</a></div>
  <a href="/about/news/">Все новости</a>
  <a href="/about/news/?PAGEN_1=2">Следующая</a>
  <a href="/about/news/kratko/">Итог</a>
  <a href="/abiturientam/priem/">Приёмная кампания</a>
</div>
</body></html>"#;

    #[test]
    fn listing_page_yields_articles_in_order() {
        let items = parse_index_page(LISTING, &page_url(), PREFIX);
        let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.muiv.ru/about/news/den-otkrytykh-dverey/",
                "https://www.muiv.ru/about/news/olimpiada/",
                "https://www.muiv.ru/about/news/bez-daty/",
            ]
        );
    }

    #[test]
    fn title_whitespace_is_collapsed() {
        let items = parse_index_page(LISTING, &page_url(), PREFIX);
        assert_eq!(items[0].title, "День открытых дверей");
    }

    #[test]
    fn date_comes_from_parent_text() {
        let items = parse_index_page(LISTING, &page_url(), PREFIX);
        assert_eq!(items[0].date, NaiveDate::from_ymd_opt(2025, 3, 14));
        assert_eq!(items[1].date, NaiveDate::from_ymd_opt(2025, 3, 2));
        assert_eq!(items[2].date, None);
    }

    #[test]
    fn short_titles_index_and_pagers_are_skipped() {
        let items = parse_index_page(LISTING, &page_url(), PREFIX);
        assert!(items.iter().all(|i| !i.url.ends_with("/kratko/")));
        assert!(items.iter().all(|i| i.url != PREFIX));
        assert!(items.iter().all(|i| !i.url.contains("PAGEN_1")));
        assert!(items.iter().all(|i| i.url.starts_with(PREFIX)));
    }

    #[test]
    fn impossible_date_is_dropped() {
        assert_eq!(find_date("опубликовано 31.02.2025"), None);
        assert_eq!(
            find_date("опубликовано 01.09.2024 в 10:00"),
            NaiveDate::from_ymd_opt(2024, 9, 1)
        );
    }

    #[test]
    fn page_without_links_is_empty() {
        assert!(parse_index_page("<html><body><p>пусто</p></body></html>", &page_url(), PREFIX)
            .is_empty());
    }
}
