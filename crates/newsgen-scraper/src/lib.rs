//! Web acquisition for the news site: a fetcher that recognises anti-bot
//! interstitials and retries them through a heavier transport, a sitemap
//! crawler that finds news article URLs without a known enumeration, and a
//! walker for the paginated news listing.

pub mod antibot;
pub mod error;
pub mod fetch;
pub mod news_index;
pub mod sitemap;

pub use antibot::{classify_antibot, AntiBotClassifier, SignalScoreClassifier};
pub use error::FetchError;
pub use fetch::{
    BrowserProfileTransport, FallbackTransport, FetchOptions, FetchResult, ResilientFetcher,
    TransportResponse,
};
pub use news_index::{parse_index_page, NewsIndexScraper, NewsItem};
pub use sitemap::{
    is_news_url, CrawlOutcome, NewsUrlSet, SiteConfig, SitemapCrawler, SitemapDocument,
    SitemapKind,
};
