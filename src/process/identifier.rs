//! Process number codec
//!
//! The portal's search form does not take the public process number as a
//! single value: it wants the `number-digit.year` prefix and the forum code
//! as separate query parameters. This module decomposes the number into
//! those fragments without any I/O.

use crate::EsajError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

// ASCII digits only: `\d` would also accept other Unicode decimal digits.
static NUMBER_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{7}-[0-9]{2}\.[0-9]{4})").expect("number-year regex"));

static FULL_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{7})-([0-9]{2})\.([0-9]{4})\.([0-9])\.([0-9]{2})\.([0-9]{4})$")
        .expect("process number regex")
});

/// A validated public process number (`NNNNNNN-DD.YYYY.J.TR.OOOO`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessId {
    value: String,
    number_year: String,
    forum_code: String,
}

impl ProcessId {
    /// Validates a process number
    ///
    /// Surrounding whitespace is ignored; anything else that does not match
    /// the fixed pattern is rejected with `FormatMismatch`.
    pub fn parse(input: &str) -> Result<Self, EsajError> {
        let trimmed = input.trim();
        let (number_year, forum_code) = decompose(trimmed)?;
        Ok(Self {
            value: trimmed.to_string(),
            number_year,
            forum_code,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Number plus check digits plus year, e.g. `1029989-06.2022`
    pub fn number_year(&self) -> &str {
        &self.number_year
    }

    /// Forum code, the last four digits, e.g. `0053`
    pub fn forum_code(&self) -> &str {
        &self.forum_code
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for ProcessId {
    type Err = EsajError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ProcessId {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

/// Splits a process number into `(number_year_fragment, forum_code)`
///
/// Both structural patterns must match. A failure is never "no data": the
/// search query built from these fragments is meaningless without both.
///
/// # Example
///
/// ```
/// use esaj_crawler::process::decompose;
///
/// let (fragment, forum) = decompose("1029989-06.2022.8.26.0053").unwrap();
/// assert_eq!(fragment, "1029989-06.2022");
/// assert_eq!(forum, "0053");
/// ```
pub fn decompose(id: &str) -> Result<(String, String), EsajError> {
    let mismatch = || EsajError::FormatMismatch {
        input: id.to_string(),
    };

    let full = FULL_NUMBER_RE.captures(id).ok_or_else(mismatch)?;
    let number_year = NUMBER_YEAR_RE.captures(id).ok_or_else(mismatch)?;

    Ok((number_year[1].to_string(), full[6].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_example() {
        let (fragment, forum) = decompose("1029989-06.2022.8.26.0053").unwrap();
        assert_eq!(fragment, "1029989-06.2022");
        assert_eq!(forum, "0053");
    }

    #[test]
    fn test_decompose_other_forum() {
        let (fragment, forum) = decompose("0000001-02.2021.8.26.0054").unwrap();
        assert_eq!(fragment, "0000001-02.2021");
        assert_eq!(forum, "0054");
    }

    #[test]
    fn test_decompose_rejects_malformed() {
        for input in [
            "",
            "1029989-06.2022",
            "1029989-06.2022.8.26.005",
            "102998-06.2022.8.26.0053",
            "1029989/06.2022.8.26.0053",
            "1029989-06x2022.8.26.0053",
            "abc",
            "1029989-06.2022.8.26.0053 trailing",
        ] {
            let err = decompose(input).unwrap_err();
            assert!(
                matches!(err, EsajError::FormatMismatch { .. }),
                "expected FormatMismatch for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_decompose_rejects_non_ascii_digits() {
        for input in [
            "١٠٢٩٩٨٩-06.2022.8.26.0053",
            "1029989-06.2022.8.26.००53",
            "1029989-０6.2022.8.26.0053",
        ] {
            assert!(
                matches!(decompose(input), Err(EsajError::FormatMismatch { .. })),
                "expected FormatMismatch for {:?}",
                input
            );
            assert!(ProcessId::parse(input).is_err());
        }
    }

    #[test]
    fn test_process_id_accessors() {
        let id = ProcessId::parse(" 1007573-30.2024.8.26.0229 ").unwrap();
        assert_eq!(id.as_str(), "1007573-30.2024.8.26.0229");
        assert_eq!(id.number_year(), "1007573-30.2024");
        assert_eq!(id.forum_code(), "0229");
        assert_eq!(id.to_string(), "1007573-30.2024.8.26.0229");
    }

    #[test]
    fn test_process_id_from_str() {
        let id: ProcessId = "1029989-06.2022.8.26.0053".parse().unwrap();
        assert_eq!(id.forum_code(), "0053");
        assert!("not-a-process".parse::<ProcessId>().is_err());
    }
}
