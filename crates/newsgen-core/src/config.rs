use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, DEFAULT_USER_AGENT};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can feed a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let log_level = or_default("NEWSGEN_LOG_LEVEL", "info");
    let user_agent = or_default("NEWSGEN_USER_AGENT", DEFAULT_USER_AGENT);
    let output_dir = PathBuf::from(or_default("NEWSGEN_OUTPUT_DIR", "./data"));

    let events_api_url = or_default(
        "NEWSGEN_EVENTS_API_URL",
        "https://kudago.com/public-api/v1.4/events/",
    );
    let location = or_default("NEWSGEN_LOCATION", "msk");
    let pages: u32 = parse_or(&lookup, "NEWSGEN_PAGES", "5")?;
    let page_size: u32 = parse_or(&lookup, "NEWSGEN_PAGE_SIZE", "100")?;
    let lang = or_default("NEWSGEN_LANG", "ru");
    let api_timeout_secs: u64 = parse_or(&lookup, "NEWSGEN_API_TIMEOUT_SECS", "45")?;
    let api_max_retries: u32 = parse_or(&lookup, "NEWSGEN_API_MAX_RETRIES", "5")?;
    let api_backoff_base_ms: u64 = parse_or(&lookup, "NEWSGEN_API_BACKOFF_BASE_MS", "700")?;
    let api_page_delay_ms: u64 = parse_or(&lookup, "NEWSGEN_API_PAGE_DELAY_MS", "0")?;
    let utc_offset_hours: i32 = parse_or(&lookup, "NEWSGEN_UTC_OFFSET_HOURS", "3")?;
    if !(-23..=23).contains(&utc_offset_hours) {
        return Err(ConfigError::InvalidEnvVar {
            var: "NEWSGEN_UTC_OFFSET_HOURS".to_string(),
            reason: format!("{utc_offset_hours} is outside -23..=23"),
        });
    }
    let min_description_chars = match lookup("NEWSGEN_MIN_DESCRIPTION_CHARS") {
        Ok(raw) if !raw.trim().is_empty() => {
            Some(parse_value::<usize>("NEWSGEN_MIN_DESCRIPTION_CHARS", &raw)?)
        }
        _ => None,
    };

    let site_base_url = or_default("NEWSGEN_SITE_BASE_URL", "https://www.muiv.ru");
    let news_path = or_default("NEWSGEN_NEWS_PATH", "/about/news/");
    let fetch_timeout_secs: u64 = parse_or(&lookup, "NEWSGEN_FETCH_TIMEOUT_SECS", "60")?;
    let max_sitemap_urls: usize = parse_or(&lookup, "NEWSGEN_MAX_SITEMAP_URLS", "500")?;
    let sitemap_child_delay_ms: u64 = parse_or(&lookup, "NEWSGEN_SITEMAP_CHILD_DELAY_MS", "200")?;
    let news_index_pages: u32 = parse_or(&lookup, "NEWSGEN_NEWS_INDEX_PAGES", "5")?;
    let news_index_delay_ms: u64 = parse_or(&lookup, "NEWSGEN_NEWS_INDEX_DELAY_MS", "500")?;
    let fallback_enabled = parse_bool(
        "NEWSGEN_FALLBACK_ENABLED",
        &or_default("NEWSGEN_FALLBACK_ENABLED", "true"),
    )?;

    Ok(AppConfig {
        log_level,
        user_agent,
        output_dir,
        events_api_url,
        location,
        pages,
        page_size,
        lang,
        api_timeout_secs,
        api_max_retries,
        api_backoff_base_ms,
        api_page_delay_ms,
        utc_offset_hours,
        min_description_chars,
        site_base_url,
        news_path,
        fetch_timeout_secs,
        max_sitemap_urls,
        sitemap_child_delay_ms,
        news_index_pages,
        news_index_delay_ms,
        fallback_enabled,
    })
}

fn parse_or<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    parse_value(var, &raw)
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Accepts the usual spellings of a boolean flag.
fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
