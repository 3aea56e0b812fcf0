use crate::base62;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A validated short code identifier for a shortened URL.
///
/// Short codes must be 1-32 characters long and contain only characters
/// from the base62 alphabet (`[0-9a-zA-Z]`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortCode(String);

const MIN_LENGTH: usize = 1;
const MAX_LENGTH: usize = 32;

impl ShortCode {
    /// Encodes a counter value into its short code.
    pub fn encode(value: u64) -> Self {
        Self(base62::encode(value))
    }

    /// Creates a new `ShortCode` after validating the input.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        Self::validate(&code)?;
        Ok(Self(code))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this only for codes read back from trusted internal sources
    /// (the repository or the cache, which only ever hold generated codes).
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Decodes the code back into the counter value that produced it.
    ///
    /// Returns `None` for codes that are alphabet-valid but not canonical
    /// (leading zero) or too large for the counter.
    pub fn decode(&self) -> Option<u64> {
        base62::decode(&self.0).ok()
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(code: &str) -> Result<(), ValidationError> {
        if code.len() < MIN_LENGTH || code.len() > MAX_LENGTH {
            return Err(ValidationError::InvalidShortCode(format!(
                "length must be between {} and {}, got {}",
                MIN_LENGTH,
                MAX_LENGTH,
                code.len()
            )));
        }

        if !code.chars().all(base62::is_digit) {
            return Err(ValidationError::InvalidShortCode(format!(
                "must contain only base62 characters [0-9a-zA-Z]: '{}'",
                code
            )));
        }

        Ok(())
    }
}

impl TryFrom<String> for ShortCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShortCode> for String {
    fn from(value: ShortCode) -> Self {
        value.0
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_codes() {
        assert!(ShortCode::new("2").is_ok());
        assert!(ShortCode::new("abcXYZ019").is_ok());
        assert!(ShortCode::new("doesnotexist").is_ok());
        assert!(ShortCode::new("a".repeat(32)).is_ok());
    }

    #[test]
    fn empty_or_too_long() {
        assert!(ShortCode::new("").is_err());
        assert!(ShortCode::new("a".repeat(33)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(ShortCode::new("abc def").is_err());
        assert!(ShortCode::new("abc-def").is_err());
        assert!(ShortCode::new("abc_def").is_err());
        assert!(ShortCode::new("abc/def").is_err());
        assert!(ShortCode::new("ab\u{e9}").is_err());
    }

    #[test]
    fn encode_and_decode_counter_values() {
        let code = ShortCode::encode(2);
        assert_eq!(code.as_str(), "2");
        assert_eq!(code.decode(), Some(2));

        assert_eq!(ShortCode::new("007").unwrap().decode(), None);
    }

    #[test]
    fn deserialize_validates() {
        let ok: ShortCode = serde_json::from_str("\"aZ9\"").unwrap();
        assert_eq!(ok.as_str(), "aZ9");

        assert!(serde_json::from_str::<ShortCode>("\"a-b\"").is_err());
    }

    #[test]
    fn to_url() {
        let code = ShortCode::new("abc123").unwrap();
        assert_eq!(code.to_url("https://shorten.it"), "https://shorten.it/abc123");
        assert_eq!(code.to_url("https://shorten.it/"), "https://shorten.it/abc123");
    }
}
