//! Shared types and configuration for the newsgen dataset builder.
//!
//! Holds the canonical [`EventRecord`] produced by the events harvester, the
//! [`DatasetPair`] training row rendered from it, and the environment-driven
//! [`AppConfig`].

pub mod app_config;
pub mod config;
pub mod dataset;
pub mod events;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use dataset::{build_pair, render_news, render_plan, safe_filename};
pub use events::{DatasetPair, EventRecord};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
