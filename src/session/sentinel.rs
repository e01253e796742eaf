//! Content sentinels for expired sessions
//!
//! The portal answers unauthorized requests with HTTP 200 and a human-readable
//! message in the body. Status codes carry no information, so authenticated
//! responses must be classified by content before being used.

use crate::{EsajError, Step};
use scraper::Html;
use std::fmt;

/// Phrase served by the search subapplication when the session is not valid
pub const ACCESS_DENIED_PHRASE: &str = "Não foi possível validar o seu acesso";

/// Phrase served by the download subapplication when the session is gone
pub const SESSION_EXPIRED_PHRASE: &str = "Sua sessão expirou";

/// Which sentinel matched a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    AccessDenied,
    SessionExpired,
}

impl Sentinel {
    pub const ALL: [Sentinel; 2] = [Sentinel::AccessDenied, Sentinel::SessionExpired];

    pub fn phrase(&self) -> &'static str {
        match self {
            Self::AccessDenied => ACCESS_DENIED_PHRASE,
            Self::SessionExpired => SESSION_EXPIRED_PHRASE,
        }
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessDenied => f.write_str("access denied"),
            Self::SessionExpired => f.write_str("session expired"),
        }
    }
}

/// Collapses every whitespace run into a single space
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Looks for either sentinel phrase in a response body
///
/// Line breaks, tabs and repeated spaces inside the phrase do not prevent a
/// match, since the portal wraps its messages freely.
pub fn detect(body: &str) -> Option<Sentinel> {
    let normalized = collapse_whitespace(body);
    Sentinel::ALL
        .into_iter()
        .find(|sentinel| normalized.contains(sentinel.phrase()))
}

/// Looks for a sentinel in an HTML page, raw or as rendered text
///
/// The rendered text has entities decoded, so an `N&atilde;o foi
/// poss&iacute;vel` page matches as well.
pub fn detect_html(body: &str) -> Option<Sentinel> {
    detect(body).or_else(|| {
        let document = Html::parse_document(body);
        let text = document.root_element().text().collect::<Vec<_>>().join(" ");
        detect(&text)
    })
}

/// Same as [`detect`] for raw bodies such as the PDF endpoint's
pub fn detect_bytes(body: &[u8]) -> Option<Sentinel> {
    detect(&String::from_utf8_lossy(body))
}

/// Fails with `SessionExpired` when an HTML body carries a sentinel
pub fn ensure_session(step: Step, body: &str) -> Result<(), EsajError> {
    match detect_html(body) {
        Some(sentinel) => {
            tracing::warn!(step = %step, %sentinel, "portal reported an invalid session");
            Err(EsajError::SessionExpired { step, sentinel })
        }
        None => Ok(()),
    }
}

/// Byte-body variant of [`ensure_session`]
pub fn ensure_session_bytes(step: Step, body: &[u8]) -> Result<(), EsajError> {
    match detect_bytes(body) {
        Some(sentinel) => {
            tracing::warn!(step = %step, %sentinel, "portal reported an invalid session");
            Err(EsajError::SessionExpired { step, sentinel })
        }
        None => Ok(()),
    }
}
