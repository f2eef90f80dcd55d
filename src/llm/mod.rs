use std::error::Error;
use std::fmt;
use std::str::FromStr;

use thiserror::Error as ThisError;

pub mod chat;
pub mod fallback;
pub mod offline;

pub const PROVIDER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    DeepSeek,
    GptOss,
    OpenAI,
    Anthropic,
}

// Tried first to last when the caller expresses no preference.
pub const AUTO_PROVIDER_ORDER: &[ProviderKind] = &[
    ProviderKind::DeepSeek,
    ProviderKind::GptOss,
    ProviderKind::OpenAI,
    ProviderKind::Anthropic,
];

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::GptOss => "gpt-oss",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProviderError {
    message: String,
}

impl fmt::Display for ParseProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ParseProviderError {}

impl FromStr for ProviderKind {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deepseek" => Ok(ProviderKind::DeepSeek),
            "gpt-oss" | "gptoss" => Ok(ProviderKind::GptOss),
            "openai" => Ok(ProviderKind::OpenAI),
            "anthropic" => Ok(ProviderKind::Anthropic),
            _ =>
                Err(ParseProviderError {
                    message: format!("Invalid provider: '{}'", s),
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderPreference {
    #[default]
    Auto,
    Exact(ProviderKind),
}

impl FromStr for ProviderPreference {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return Ok(ProviderPreference::Auto);
        }
        ProviderKind::from_str(trimmed).map(ProviderPreference::Exact)
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(ThisError, Debug)]
pub enum ProviderError {
    #[error("network error: {0}")] Network(String),
    #[error("api error: {status} - {message}")] Api {
        status: u16,
        message: String,
    },
    #[error("request timed out after {0}s")] Timeout(u64),
    #[error("malformed provider response: {0}")] Malformed(String),
    #[error("provider configuration error: {0}")] Configuration(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ProviderError::Timeout(PROVIDER_TIMEOUT_SECS);
        }
        if let Some(status) = err.status() {
            return ProviderError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        if err.is_decode() {
            return ProviderError::Malformed(err.to_string());
        }
        ProviderError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip() {
        for kind in AUTO_PROVIDER_ORDER {
            assert_eq!(ProviderKind::from_str(kind.as_str()).unwrap(), *kind);
        }
    }

    #[test]
    fn preference_parses_auto_and_exact() {
        assert_eq!(ProviderPreference::from_str("auto").unwrap(), ProviderPreference::Auto);
        assert_eq!(ProviderPreference::from_str("").unwrap(), ProviderPreference::Auto);
        assert_eq!(
            ProviderPreference::from_str("Anthropic").unwrap(),
            ProviderPreference::Exact(ProviderKind::Anthropic)
        );
        assert!(ProviderPreference::from_str("claude").is_err());
    }

    #[test]
    fn auto_order_runs_deepseek_first_anthropic_last() {
        assert_eq!(AUTO_PROVIDER_ORDER.first(), Some(&ProviderKind::DeepSeek));
        assert_eq!(AUTO_PROVIDER_ORDER.last(), Some(&ProviderKind::Anthropic));
        assert_eq!(AUTO_PROVIDER_ORDER.len(), 4);
    }
}
