//! Domain types shared by the engine and the CLI.
//!
//! Storage keys are plain `String`s (slash-separated, no leading slash);
//! the one key shape with meaning of its own is the day prefix, modelled by
//! [`DayKey`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// DayKey
// ---------------------------------------------------------------------------

/// A calendar day identifying one page of the pagination chain.
///
/// Rendered and parsed as `YYYY-MM-DD`; ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayKey(pub NaiveDate);

impl DayKey {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    /// The day a storage key belongs to, if it is chain-eligible.
    ///
    /// A key is chain-eligible when it starts with a real `YYYY-MM-DD` date
    /// followed by `/`. One leading `/` is tolerated.
    pub fn from_storage_key(key: &str) -> Option<Self> {
        let key = key.strip_prefix('/').unwrap_or(key);
        let head = key.get(..10)?;
        if !key[10..].starts_with('/') || !is_date_shaped(head) {
            return None;
        }
        NaiveDate::parse_from_str(head, Self::FORMAT).ok().map(Self)
    }
}

fn is_date_shaped(s: &str) -> bool {
    s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_date_shaped(s) {
            return Err(CoreError::InvalidKey {
                key: s.to_owned(),
                reason: "expected YYYY-MM-DD",
            });
        }
        NaiveDate::parse_from_str(s, Self::FORMAT)
            .map(Self)
            .map_err(|_| CoreError::InvalidKey {
                key: s.to_owned(),
                reason: "not a calendar date",
            })
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

// ---------------------------------------------------------------------------
// Storage keys
// ---------------------------------------------------------------------------

/// Normalise a storage key: strip one leading `/`, reject empty keys.
pub fn normalize_storage_key(key: &str) -> Result<String, CoreError> {
    let trimmed = key.strip_prefix('/').unwrap_or(key);
    if trimmed.is_empty() {
        return Err(CoreError::InvalidKey {
            key: key.to_owned(),
            reason: "key is empty",
        });
    }
    if trimmed.split('/').any(|segment| segment == "..") {
        return Err(CoreError::InvalidKey {
            key: key.to_owned(),
            reason: "key escapes the site root",
        });
    }
    Ok(trimmed.to_owned())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_key_from_page_key() {
        let day = DayKey::from_storage_key("2023-11-01/index.html").expect("day");
        assert_eq!(day.to_string(), "2023-11-01");
        assert_eq!(
            DayKey::from_storage_key("/2023-11-01/index.html"),
            Some(day)
        );
    }

    #[test]
    fn day_key_rejects_non_chain_keys() {
        assert_eq!(DayKey::from_storage_key("index.html"), None);
        assert_eq!(DayKey::from_storage_key("2023-11-01.html"), None);
        assert_eq!(DayKey::from_storage_key("2023-11-01"), None);
        assert_eq!(DayKey::from_storage_key("2023-02-30/index.html"), None);
        assert_eq!(DayKey::from_storage_key("assets/2023-11-01/x.css"), None);
        assert_eq!(DayKey::from_storage_key("2023-1-01x/index.html"), None);
    }

    #[test]
    fn day_keys_order_chronologically() {
        let a: DayKey = "2023-09-30".parse().unwrap();
        let b: DayKey = "2023-10-01".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn day_key_parse_errors() {
        assert!("2023-13-01".parse::<DayKey>().is_err());
        assert!("yesterday".parse::<DayKey>().is_err());
    }

    #[test]
    fn storage_key_normalization() {
        assert_eq!(normalize_storage_key("/a/b.css").unwrap(), "a/b.css");
        assert_eq!(normalize_storage_key("a/b.css").unwrap(), "a/b.css");
        assert!(normalize_storage_key("").is_err());
        assert!(normalize_storage_key("/").is_err());
        assert!(normalize_storage_key("../etc/passwd").is_err());
    }
}
