use std::fmt;

/// The two session cookies the portal hands out after login
///
/// Both are opaque `Cookie` header values sent verbatim. They are minted by an
/// external login flow and never renewed here; an empty string means the
/// cookie was not supplied.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionCredentials {
    search: String,
    download: String,
}

impl SessionCredentials {
    /// # Arguments
    ///
    /// * `search` - cookie for the search/view subapplication (`/cpopg`), e.g.
    ///   `JSESSIONID=EACA…cas11; K-JSESSIONID-nckcjpip=0E4D…`
    /// * `download` - cookie for the digital folder subapplication
    ///   (`/pastadigital`), e.g. `JSESSIONID=8A1F…pasta3; K-JSESSIONID-phoaambo=0E4D…`
    pub fn new(search: impl Into<String>, download: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            download: download.into(),
        }
    }

    pub fn search(&self) -> Option<&str> {
        non_empty(&self.search)
    }

    pub fn download(&self) -> Option<&str> {
        non_empty(&self.download)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

// Cookie values are secrets; keep them out of logs.
impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("search", &self.search().map(|_| "<redacted>"))
            .field("download", &self.download().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cookies_are_absent() {
        let creds = SessionCredentials::new("  ", "");
        assert_eq!(creds.search(), None);
        assert_eq!(creds.download(), None);
    }

    #[test]
    fn test_both_cookies_present() {
        let creds = SessionCredentials::new("JSESSIONID=a", "JSESSIONID=b");
        assert_eq!(creds.search(), Some("JSESSIONID=a"));
        assert_eq!(creds.download(), Some("JSESSIONID=b"));
    }

    #[test]
    fn test_debug_redacts_values() {
        let creds = SessionCredentials::new("JSESSIONID=secret", "");
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("redacted"));
    }
}
