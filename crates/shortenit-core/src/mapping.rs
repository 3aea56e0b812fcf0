use crate::long_url::LongUrl;
use crate::shortcode::ShortCode;
use jiff::Timestamp;

/// A committed long URL <-> short code pair.
///
/// Mappings are immutable once committed: there is exactly one code per
/// long URL and one long URL per code, and neither is ever reassigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub long_url: LongUrl,
    pub short_code: ShortCode,
    pub created_at: Timestamp,
}

impl Mapping {
    /// Creates a mapping stamped with the current time.
    pub fn new(long_url: LongUrl, short_code: ShortCode) -> Self {
        Self {
            long_url,
            short_code,
            created_at: Timestamp::now(),
        }
    }
}
