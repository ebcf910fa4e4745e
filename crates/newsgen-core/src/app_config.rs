use std::path::PathBuf;

/// Default user agent shared by the API session and the page fetcher.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub user_agent: String,
    pub output_dir: PathBuf,

    pub events_api_url: String,
    pub location: String,
    pub pages: u32,
    pub page_size: u32,
    pub lang: String,
    pub api_timeout_secs: u64,
    pub api_max_retries: u32,
    pub api_backoff_base_ms: u64,
    pub api_page_delay_ms: u64,
    /// Hours east of UTC used for the human-readable event date strings.
    pub utc_offset_hours: i32,
    /// Drop events whose description is shorter than this many characters.
    /// `None` keeps every event regardless of description length.
    pub min_description_chars: Option<usize>,

    pub site_base_url: String,
    pub news_path: String,
    pub fetch_timeout_secs: u64,
    pub max_sitemap_urls: usize,
    pub sitemap_child_delay_ms: u64,
    /// Listing pages walked by the news-index scraper.
    pub news_index_pages: u32,
    pub news_index_delay_ms: u64,
    pub fallback_enabled: bool,
}
