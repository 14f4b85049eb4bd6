use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};

use crate::error::{Error, Result};

/// Credential variables, checked in order.
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
pub const MAX_OUTPUT_TOKENS: u32 = 4096;
pub const TEMPERATURE: f32 = 0.7;

/// Settings for one run, fixed once the arguments are parsed.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target: PathBuf,
    pub batch_size: usize,
    pub wait: Duration,
}

impl RunConfig {
    /// Parses the batch size and wait time as given on the command line.
    pub fn from_args(target: PathBuf, batch_size: &str, wait_ms: &str) -> Result<Self> {
        let batch_size = parse_number("batch size", batch_size)?;
        let wait_ms = parse_number("wait time", wait_ms)?;
        Self::new(target, batch_size, wait_ms)
    }

    /// Builds a config from raw CLI values. Both numbers must be positive.
    pub fn new(target: PathBuf, batch_size: i64, wait_ms: i64) -> Result<Self> {
        let batch_size = usize::try_from(batch_size)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| Error::config(format!("batch size must be at least 1, got {batch_size}")))?;
        let wait_ms = u64::try_from(wait_ms)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                Error::config(format!("wait time must be at least 1 millisecond, got {wait_ms}"))
            })?;
        Ok(Self {
            target,
            batch_size,
            wait: Duration::from_millis(wait_ms),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl GenerationConfig {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

fn parse_number(name: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{name} must be a whole number, got '{value}'")))
}

/// Finds the API key through `lookup`, usually `std::env::var`.
pub fn load_api_key(lookup: impl Fn(&str) -> Option<String>) -> Result<SecretString> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .find(|value| !value.trim().is_empty())
        .map(SecretString::from)
        .ok_or_else(|| Error::MissingCredential {
            vars: API_KEY_VARS.join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_run_config_defaults_are_valid() {
        let config = RunConfig::new(PathBuf::from("src"), 5, 10_000).unwrap();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.wait, Duration::from_secs(10));
    }

    #[test]
    fn test_run_config_rejects_zero_batch_size() {
        let err = RunConfig::new(PathBuf::from("src"), 0, 10_000).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_run_config_rejects_zero_wait() {
        let err = RunConfig::new(PathBuf::from("src"), 3, 0).unwrap_err();
        assert!(err.to_string().contains("wait time"));
    }

    #[test]
    fn test_run_config_from_args() {
        let config = RunConfig::from_args(PathBuf::from("src"), "3", " 250 ").unwrap();
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.wait, Duration::from_millis(250));
    }

    #[test]
    fn test_run_config_rejects_non_numeric_args() {
        let err = RunConfig::from_args(PathBuf::from("src"), "abc", "10").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert!(err.to_string().contains("'abc'"));

        let err = RunConfig::from_args(PathBuf::from("src"), "5", "x").unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("wait time"));
    }

    #[test]
    fn test_run_config_rejects_negative_values() {
        let err = RunConfig::new(PathBuf::from("src"), -2, 10).unwrap_err();
        assert!(err.to_string().contains("got -2"));
        let err = RunConfig::new(PathBuf::from("src"), 2, -10).unwrap_err();
        assert!(err.to_string().contains("got -10"));
    }

    #[test]
    fn test_generation_config_keeps_limits_for_custom_model() {
        let config = GenerationConfig::for_model("gemini-2.0-flash");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.max_output_tokens, 4096);
        assert_eq!(config.temperature, 0.7);
    }

    #[test]
    fn test_api_key_prefers_first_variable() {
        let key = load_api_key(|var| Some(format!("{var}-value"))).unwrap();
        assert_eq!(key.expose_secret(), "API_KEY-value");
    }

    #[test]
    fn test_api_key_falls_back_to_gemini_variable() {
        let key = load_api_key(|var| match var {
            "API_KEY" => Some("  ".to_string()),
            "GEMINI_API_KEY" => Some("g-key".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(key.expose_secret(), "g-key");
    }

    #[test]
    fn test_api_key_missing() {
        let err = load_api_key(|_| None).unwrap_err();
        assert!(matches!(err, Error::MissingCredential { .. }));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
