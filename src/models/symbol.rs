//! Instrument symbol and its extraction from a quote-page URL.

use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::AcquisitionError;

lazy_static! {
    /// Matches `/quote/<token>/history` anywhere in a URL path.
    /// The literal segments are case-insensitive; the token is any run of
    /// non-slash characters.
    static ref QUOTE_PATH: Regex = Regex::new(r"(?i)/quote/([^/]+)/history").unwrap();
}

/// A short uppercase token identifying an instrument (e.g. "TSLA").
///
/// Immutable once extracted; produced only by [`Symbol::from_quote_url`] so
/// every downstream stage can rely on the uppercase normalization.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Extract the symbol from a quote-page URL.
    ///
    /// The URL's path component must contain `/quote/<token>/history`;
    /// trailing path segments and query strings are ignored. The token is
    /// case-folded to uppercase but otherwise preserved verbatim (including
    /// any percent-encoding).
    ///
    /// Fails with [`AcquisitionError::InvalidUrlFormat`] for anything else,
    /// including strings that are not absolute URLs. No network access.
    pub fn from_quote_url(url: &str) -> Result<Self, AcquisitionError> {
        let parsed =
            Url::parse(url).map_err(|_| AcquisitionError::InvalidUrlFormat(url.to_string()))?;

        let captures = QUOTE_PATH
            .captures(parsed.path())
            .ok_or_else(|| AcquisitionError::InvalidUrlFormat(url.to_string()))?;

        Ok(Self(Arc::from(captures[1].to_uppercase().as_str())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
