use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Display;
use url::Url;

/// Upper bound on accepted long URLs, in bytes.
pub const MAX_LENGTH: usize = 2048;

/// A validated absolute `http`/`https` URL.
///
/// The original string is kept verbatim (not normalised): it is the value
/// handed back by backward resolution and the key of the forward cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LongUrl(String);

/// RFC 3986 unreserved and reserved characters, plus `%` for escapes.
fn is_url_safe(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '.'
                | '_'
                | '~'
                | ':'
                | '/'
                | '?'
                | '#'
                | '['
                | ']'
                | '@'
                | '!'
                | '$'
                | '&'
                | '\''
                | '('
                | ')'
                | '*'
                | '+'
                | ','
                | ';'
                | '='
                | '%'
        )
}

impl LongUrl {
    /// Validates `raw` as a long URL.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();

        if raw.is_empty() {
            return Err(ValidationError::EmptyLongUrl);
        }
        if raw.len() > MAX_LENGTH {
            return Err(ValidationError::LongUrlTooLong {
                max: MAX_LENGTH,
                actual: raw.len(),
            });
        }
        if let Some(c) = raw.chars().find(|c| !is_url_safe(*c)) {
            return Err(ValidationError::InvalidLongUrl(format!(
                "contains disallowed character {c:?}"
            )));
        }

        let parsed = Url::parse(&raw).map_err(|e| ValidationError::InvalidLongUrl(e.to_string()))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ValidationError::InvalidLongUrl(format!(
                    "scheme must be http or https, got '{other}'"
                )))
            }
        }

        // `Url::parse` also accepts `http:host` and `http:///host`; require
        // the `scheme://authority` form as written.
        let authority = raw[parsed.scheme().len()..].strip_prefix("://");
        match authority {
            Some(rest) if !rest.is_empty() && !rest.starts_with(['/', '?', '#']) => {}
            _ => {
                return Err(ValidationError::InvalidLongUrl(
                    "expected scheme://host".to_string(),
                ))
            }
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ValidationError::InvalidLongUrl(
                "host must not be empty".to_string(),
            ));
        }

        Ok(Self(raw))
    }

    /// Wraps a stored URL without validation.
    ///
    /// Only for values read back from the repository or the cache.
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Computes the digest used as the reverse-index key.
    pub fn hash(&self) -> LongUrlHash {
        LongUrlHash::of(self)
    }
}

impl TryFrom<String> for LongUrl {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<LongUrl> for String {
    fn from(value: LongUrl) -> Self {
        value.0
    }
}

impl Display for LongUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex-encoded SHA-256 of a [`LongUrl`]; always 64 characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LongUrlHash(String);

impl LongUrlHash {
    pub const LEN: usize = 64;

    pub fn of(url: &LongUrl) -> Self {
        let digest = Sha256::digest(url.as_str().as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LongUrlHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
