//! Positional base62 codec over `0-9a-zA-Z`.
//!
//! Encoding is bijective between `u64` and canonical strings: `0` encodes
//! as `"0"`, no other value encodes with a leading `'0'`, and the encoded
//! length never shrinks as the value grows.

/// The digit alphabet, in value order.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u64 = 62;

/// Longest canonical encoding of a `u64` (`u64::MAX` is 11 digits).
pub const MAX_ENCODED_LEN: usize = 11;

/// Returns `true` if `c` belongs to [`ALPHABET`].
pub fn is_digit(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

fn digit_value(byte: u8) -> Option<u64> {
    let value = match byte {
        b'0'..=b'9' => byte - b'0',
        b'a'..=b'z' => byte - b'a' + 10,
        b'A'..=b'Z' => byte - b'A' + 36,
        _ => return None,
    };
    Some(u64::from(value))
}

/// Encodes `value` as a base62 string.
pub fn encode(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(MAX_ENCODED_LEN);
    while value > 0 {
        digits.push(ALPHABET[(value % BASE) as usize]);
        value /= BASE;
    }
    digits.reverse();

    // Every byte comes from ALPHABET, which is ASCII.
    digits.into_iter().map(char::from).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("empty input")]
    Empty,
    #[error("'{0}' is not a base62 digit")]
    InvalidDigit(char),
    #[error("leading zero in '{0}'")]
    LeadingZero(String),
    #[error("'{0}' overflows u64")]
    Overflow(String),
}

/// Decodes a canonical base62 string back into the value it encodes.
pub fn decode(input: &str) -> Result<u64, DecodeError> {
    if input.is_empty() {
        return Err(DecodeError::Empty);
    }
    if input.len() > 1 && input.starts_with('0') {
        return Err(DecodeError::LeadingZero(input.to_string()));
    }

    input.bytes().try_fold(0_u64, |acc, byte| {
        let digit = digit_value(byte).ok_or(DecodeError::InvalidDigit(char::from(byte)))?;
        acc.checked_mul(BASE)
            .and_then(|shifted| shifted.checked_add(digit))
            .ok_or_else(|| DecodeError::Overflow(input.to_string()))
    })
}
