//! Byte-to-text codecs for seed strings. One codec is chosen at startup and injected into
//! the seed codec; output bytes never depend on where the code runs.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use serde::{Deserialize, Serialize};

pub trait TextCodec: Send + Sync {
    fn encode(&self, bytes: &[u8]) -> String;
    fn decode(&self, text: &str) -> Result<Vec<u8>, base64::DecodeError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alphabet {
    /// `A-Z a-z 0-9 + /` with `=` padding.
    #[default]
    Standard,
    /// `-` and `_` in place of `+` and `/`, padded.
    UrlSafe,
}

impl Alphabet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::UrlSafe => "url_safe",
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Alphabet {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "standard" => Ok(Self::Standard),
            "url_safe" | "urlsafe" => Ok(Self::UrlSafe),
            other => Err(format!("unknown seed alphabet '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec {
    alphabet: Alphabet,
}

impl Base64Codec {
    pub fn new(alphabet: Alphabet) -> Self {
        Self { alphabet }
    }

    pub fn standard() -> Self {
        Self::new(Alphabet::Standard)
    }

    pub fn url_safe() -> Self {
        Self::new(Alphabet::UrlSafe)
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }
}

impl TextCodec for Base64Codec {
    fn encode(&self, bytes: &[u8]) -> String {
        match self.alphabet {
            Alphabet::Standard => STANDARD.encode(bytes),
            Alphabet::UrlSafe => URL_SAFE.encode(bytes),
        }
    }

    fn decode(&self, text: &str) -> Result<Vec<u8>, base64::DecodeError> {
        match self.alphabet {
            Alphabet::Standard => STANDARD.decode(text),
            Alphabet::UrlSafe => URL_SAFE.decode(text),
        }
    }
}
