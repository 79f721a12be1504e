use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A short identifier for a stored URL.
///
/// Ids are plain integers rendered in canonical decimal form (`"1"`, `"42"`).
/// The pool hands them out starting from 1, so `0` parses fine but never
/// names a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrlId(u64);

/// `u64::MAX` has 20 decimal digits.
const MAX_DIGITS: usize = 20;

impl UrlId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Parses an id from a path segment.
    ///
    /// Only canonical decimal is accepted: no sign, no whitespace and no
    /// leading zeros, so every id has exactly one textual form. This is
    /// stricter than a plain integer parse: `+7`, `-1` and `007` are
    /// malformed here instead of naming (or missing) id 7.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() || raw.len() > MAX_DIGITS {
            return Err(CoreError::InvalidId(format!(
                "length must be between 1 and {MAX_DIGITS}, got {}",
                raw.len()
            )));
        }

        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidId(format!(
                "must contain only decimal digits: '{raw}'"
            )));
        }

        if raw.len() > 1 && raw.starts_with('0') {
            return Err(CoreError::InvalidId(format!(
                "must not have leading zeros: '{raw}'"
            )));
        }

        raw.parse::<u64>()
            .map(Self)
            .map_err(|e| CoreError::InvalidId(format!("'{raw}': {e}")))
    }
}

impl From<u64> for UrlId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for UrlId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Display for UrlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Ids travel as strings on the wire, matching the path segment form.
impl Serialize for UrlId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UrlId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
