//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made to the portal:
//! - Building the HTTP client with the configured timeouts and user agent
//! - GET requests carrying a session cookie verbatim
//! - Racing every request against the crawl deadline and cancellation
//!
//! Status codes are deliberately not interpreted. The portal answers
//! authorization failures with HTTP 200, so callers classify bodies through
//! the sentinel detector instead.

use crate::config::PortalConfig;
use crate::crawler::CrawlContext;
use crate::{EsajError, Step};
use reqwest::header::COOKIE;
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use esaj_crawler::config::PortalConfig;
/// use esaj_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&PortalConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &PortalConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

async fn send(
    client: &Client,
    step: Step,
    url: &Url,
    cookie: Option<&str>,
) -> Result<Response, EsajError> {
    tracing::debug!(step = %step, url = %url, authenticated = cookie.is_some(), "GET");

    let mut request = client.get(url.clone());
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }

    let response = request.send().await.map_err(|source| EsajError::Http {
        step,
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        // Logged only; the body decides what happened.
        tracing::warn!(step = %step, url = %url, status = status.as_u16(), "non-success status");
    }

    Ok(response)
}

/// Fetches a page as text
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `ctx` - Deadline and cancellation of the current crawl
/// * `step` - Step name attached to any error
/// * `url` - The URL to fetch
/// * `cookie` - `Cookie` header value, sent verbatim when present
pub async fn fetch_text(
    client: &Client,
    ctx: &CrawlContext,
    step: Step,
    url: &Url,
    cookie: Option<&str>,
) -> Result<String, EsajError> {
    ctx.run(step, async {
        let response = send(client, step, url, cookie).await?;
        response.text().await.map_err(|source| EsajError::Http {
            step,
            url: url.to_string(),
            source,
        })
    })
    .await
}

/// Fetches a body as raw bytes (PDF downloads)
pub async fn fetch_bytes(
    client: &Client,
    ctx: &CrawlContext,
    step: Step,
    url: &Url,
    cookie: Option<&str>,
) -> Result<Vec<u8>, EsajError> {
    ctx.run(step, async {
        let response = send(client, step, url, cookie).await?;
        let bytes = response.bytes().await.map_err(|source| EsajError::Http {
            step,
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    })
    .await
}
