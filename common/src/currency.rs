//! Currency identifiers and the session catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A short currency identifier ("usd", "eur", ...).
///
/// Codes are case-insensitive; the canonical form kept here is lowercase,
/// matching the rate API's JSON keys and endpoint paths. `Display` renders
/// the uppercase token used in user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a currency code, normalizing to the lowercase wire form.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_lowercase())
    }

    /// The lowercase wire form, used in endpoint paths and JSON keys.
    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("usd")
    }

    pub fn eur() -> Self {
        Self::new("eur")
    }

    pub fn gbp() -> Self {
        Self::new("gbp")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_uppercase())
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Code to display-name mapping, fetched once per session and never mutated.
///
/// Deserializes directly from the `/currencies.json` wire shape. Iteration
/// is ordered by code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCatalog(BTreeMap<String, String>);

impl CurrencyCatalog {
    /// Build a catalog from code/name pairs.
    pub fn from_pairs<C, N>(pairs: impl IntoIterator<Item = (C, N)>) -> Self
    where
        C: AsRef<str>,
        N: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(code, name)| (CurrencyCode::new(code).0, name.into()))
                .collect(),
        )
    }

    /// Display name for a currency, if listed.
    pub fn name_of(&self, code: &CurrencyCode) -> Option<&str> {
        self.0.get(code.code()).map(String::as_str)
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.0.contains_key(code.code())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (code, display name), ordered by code.
    pub fn iter(&self) -> impl Iterator<Item = (CurrencyCode, &str)> {
        self.0
            .iter()
            .map(|(code, name)| (CurrencyCode::new(code), name.as_str()))
    }
}
