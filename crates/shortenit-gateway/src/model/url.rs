use serde::{Deserialize, Serialize};
use shortenit_core::{LongUrl, ShortCode};

#[derive(Debug, Deserialize)]
pub struct ForwardRequest {
    pub long_url: String,
}

#[derive(Debug, Serialize)]
pub struct ForwardResponse {
    pub status: &'static str,
    pub short_url: String,
}

impl From<ShortCode> for ForwardResponse {
    fn from(code: ShortCode) -> Self {
        Self {
            status: "ok",
            short_url: code.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BackwardRequest {
    pub short_url: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackwardResponse {
    #[serde(rename = "ok")]
    Found { long_url: String },
    NotFound,
}

impl From<Option<LongUrl>> for BackwardResponse {
    fn from(value: Option<LongUrl>) -> Self {
        match value {
            Some(long_url) => Self::Found {
                long_url: long_url.into(),
            },
            None => Self::NotFound,
        }
    }
}
