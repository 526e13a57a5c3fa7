//! Start-up configuration read from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `GOOGLE_API_KEY` | required | Gemini API key |
//! | `BLOGSMITH_MODEL` | `gemini-1.5-pro` | Gemini model name |
//! | `BLOGSMITH_TEMPERATURE` | `0.5` | Sampling temperature, `0.0..=2.0` |
//! | `BLOGSMITH_OUTPUT_DIR` | `.` | Directory artifacts are written to |
//! | `BLOGSMITH_LOG_FORMAT` | `pretty` | `pretty` or `json` |
//! | `GEMINI_BASE_URL` | Google endpoint | API base URL |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | unset | Enables OTLP span export |
//!
//! Log filtering itself is controlled by `RUST_LOG`.

use std::path::PathBuf;

use llm::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use thiserror::Error;

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const MODEL_VAR: &str = "BLOGSMITH_MODEL";
pub const TEMPERATURE_VAR: &str = "BLOGSMITH_TEMPERATURE";
pub const OUTPUT_DIR_VAR: &str = "BLOGSMITH_OUTPUT_DIR";
pub const LOG_FORMAT_VAR: &str = "BLOGSMITH_LOG_FORMAT";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
pub const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

const MAX_TEMPERATURE: f32 = 2.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} must be a number between 0.0 and {max}, got '{value}'")]
    InvalidTemperature {
        var: &'static str,
        value: String,
        max: f32,
    },

    #[error("{var} must be 'pretty' or 'json', got '{value}'")]
    InvalidLogFormat { var: &'static str, value: String },
}

/// Output style of the stderr log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    pub gemini: GeminiConfig,
    pub output_dir: PathBuf,
    pub log_format: LogFormat,
    pub otlp_endpoint: Option<String>,
}

impl CliConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_VAR).ok_or(ConfigError::Missing(API_KEY_VAR))?;

        let temperature = match get(TEMPERATURE_VAR) {
            None => DEFAULT_TEMPERATURE,
            Some(raw) => raw
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|t| t.is_finite() && (0.0..=MAX_TEMPERATURE).contains(t))
                .ok_or(ConfigError::InvalidTemperature {
                    var: TEMPERATURE_VAR,
                    value: raw,
                    max: MAX_TEMPERATURE,
                })?,
        };

        let log_format = match get(LOG_FORMAT_VAR).map(|v| v.trim().to_ascii_lowercase()) {
            None => LogFormat::default(),
            Some(v) if v == "pretty" => LogFormat::Pretty,
            Some(v) if v == "json" => LogFormat::Json,
            Some(value) => {
                return Err(ConfigError::InvalidLogFormat {
                    var: LOG_FORMAT_VAR,
                    value,
                })
            }
        };

        Ok(Self {
            gemini: GeminiConfig {
                api_key,
                model: get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
                temperature,
                base_url: get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            },
            output_dir: get(OUTPUT_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            log_format,
            otlp_endpoint: get(OTLP_ENDPOINT_VAR),
        })
    }
}
