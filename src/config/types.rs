use serde::Deserialize;

/// Main configuration structure for esaj-crawler
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub portal: PortalConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the portal lives and how to talk to it
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Scheme and host of the portal, e.g. "https://esaj.tjsp.jus.br"
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://esaj.tjsp.jus.br".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("esaj-crawler/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Session cookies minted by the external login flow
///
/// Overridden by `ESAJ_COOKIE_SESSION` and `ESAJ_COOKIE_PDF_SESSION`.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// `Cookie` header for the search pages (`/cpopg`)
    #[serde(rename = "cookie-session")]
    pub cookie_session: String,

    /// `Cookie` header for the digital folder pages (`/pastadigital`)
    #[serde(rename = "cookie-pdf-session")]
    pub cookie_pdf_session: String,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("cookie_session", &!self.cookie_session.is_empty())
            .field("cookie_pdf_session", &!self.cookie_pdf_session.is_empty())
            .finish()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Folder movement titles whose documents get downloaded
    #[serde(rename = "allowed-statuses")]
    pub allowed_statuses: Vec<String>,

    /// Upper bound for one crawl, i.e. one enumeration or one process
    /// (seconds, 0 disables it)
    #[serde(rename = "deadline-secs")]
    pub deadline_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            allowed_statuses: vec!["certidão de publicação".to_string()],
            deadline_secs: 120,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory the downloaded PDFs are written to
    #[serde(rename = "documents-dir")]
    pub documents_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./esaj.db".to_string(),
            documents_dir: "./documents".to_string(),
        }
    }
}
