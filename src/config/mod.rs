//! Configuration module for esaj-crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use esaj_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("esaj.toml")).unwrap();
//! println!("Crawling {}", config.portal.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, PortalConfig, SessionConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash,
    COOKIE_PDF_SESSION_ENV, COOKIE_SESSION_ENV,
};
pub use validation::validate;
