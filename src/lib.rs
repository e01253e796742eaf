//! esaj-crawler: process data and document extraction for the e-SAJ court portal
//!
//! The portal has no API. Everything here is scraped from browser-oriented HTML
//! pages, some of them behind two session cookies minted by an external login
//! flow. Expired sessions are only visible as sentinel phrases inside HTTP 200
//! bodies, so every authenticated step classifies the body before trusting it.

pub mod config;
pub mod crawler;
pub mod output;
pub mod process;
pub mod session;
pub mod storage;

use std::fmt;
use thiserror::Error;

/// The crawl step an error was raised from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Searching the internal process code by public process number
    LocateProcessCode,
    /// Resolving the digital folder URL
    OpenFolder,
    /// Loading the digital folder payload
    LoadFolder,
    /// Downloading one PDF document
    DownloadDocument,
    /// Reading the process "show" page
    FetchBasicInfo,
    /// Walking the OAB result listing
    Enumerate,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocateProcessCode => "locate-process-code",
            Self::OpenFolder => "open-folder",
            Self::LoadFolder => "load-folder",
            Self::DownloadDocument => "download-document",
            Self::FetchBasicInfo => "fetch-basic-info",
            Self::Enumerate => "enumerate",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for esaj-crawler operations
#[derive(Debug, Error)]
pub enum EsajError {
    #[error("Process identifier does not match NNNNNNN-DD.YYYY.J.TR.OOOO: {input}")]
    FormatMismatch { input: String },

    #[error("[{step}] not found: {what}")]
    NotFound { step: Step, what: String },

    #[error("[{step}] parse error: {message}")]
    Parse { step: Step, message: String },

    #[error("[{step}] session expired ({sentinel})")]
    SessionExpired {
        step: Step,
        sentinel: session::Sentinel,
    },

    #[error("[{step}] missing {which} session cookie")]
    MissingCredential { step: Step, which: &'static str },

    #[error("[{step}] HTTP error for {url}: {source}")]
    Http {
        step: Step,
        url: String,
        source: reqwest::Error,
    },

    #[error("[{step}] cancelled")]
    Cancelled { step: Step },

    #[error("[{step}] deadline exceeded")]
    DeadlineExceeded { step: Step },

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

impl EsajError {
    /// True when the portal reported an expired or invalid session.
    ///
    /// Callers use this to re-authenticate and re-run instead of treating the
    /// failure like any other.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// The crawl step that raised the error, if it came from a crawl step
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::NotFound { step, .. }
            | Self::Parse { step, .. }
            | Self::SessionExpired { step, .. }
            | Self::MissingCredential { step, .. }
            | Self::Http { step, .. }
            | Self::Cancelled { step }
            | Self::DeadlineExceeded { step } => Some(*step),
            _ => None,
        }
    }

    pub(crate) fn not_found(step: Step, what: impl Into<String>) -> Self {
        Self::NotFound {
            step,
            what: what.into(),
        }
    }

    pub(crate) fn parse(step: Step, message: impl Into<String>) -> Self {
        Self::Parse {
            step,
            message: message.into(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for esaj-crawler operations
pub type Result<T> = std::result::Result<T, EsajError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    CrawlContext, DigitalFolderNode, DownloadedDocument, EsajClient, StatusAllowList,
};
pub use process::{ProcessBasicInfo, ProcessId, ProcessSeed};
pub use session::{Sentinel, SessionCredentials};
