//! Service settings loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use trip_planner::{DEFAULT_MAX_DAYS, GenerationParams, PlannerError, Result};

/// Output format for service logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(format!("expected json or pretty, got {:?}", other)),
        }
    }
}

/// Runtime configuration for the HTTP service
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_name: String,
    /// Prefix every API route is nested under
    pub api_v1_str: String,
    pub host: String,
    pub port: u16,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub gemini_timeout: Duration,
    pub generation: GenerationParams,
    /// Inclusive ceiling on requested trip length
    pub max_trip_days: u32,
    /// Empty means any origin is allowed
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings, reading a `.env` file first when one exists.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| PlannerError::Config("GEMINI_API_KEY not set".to_string()))?;

        let max_trip_days: u32 = parse_var(&lookup, "MAX_TRIP_DAYS", DEFAULT_MAX_DAYS)?;
        if max_trip_days == 0 {
            return Err(PlannerError::Config(
                "MAX_TRIP_DAYS must be at least 1".to_string(),
            ));
        }

        let defaults = GenerationParams::default();

        Ok(Self {
            project_name: get("PROJECT_NAME", "Trip Planner API"),
            api_v1_str: normalize_prefix(&get("API_V1_STR", "/api/v1")),
            host: get("HOST", "0.0.0.0"),
            port: parse_var(&lookup, "PORT", 8000)?,
            gemini_api_key,
            gemini_base_url: get(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta/openai",
            ),
            gemini_model: get("GEMINI_MODEL", "gemini-2.0-flash"),
            gemini_timeout: Duration::from_secs(parse_var(&lookup, "GEMINI_TIMEOUT_SECS", 30)?),
            generation: GenerationParams {
                max_tokens: parse_var(&lookup, "GEMINI_MAX_TOKENS", defaults.max_tokens)?,
                temperature: parse_var(&lookup, "GEMINI_TEMPERATURE", defaults.temperature)?,
            },
            max_trip_days,
            cors_origins: lookup("BACKEND_CORS_ORIGINS")
                .map(|raw| parse_cors_origins(&raw))
                .transpose()?
                .unwrap_or_default(),
            log_format: parse_var(&lookup, "LOG_FORMAT", LogFormat::default())?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| PlannerError::Config(format!("{} is invalid: {}", key, e))),
    }
}

/// Accepts either `a,b,c` or a JSON array of strings.
fn parse_cors_origins(raw: &str) -> Result<Vec<String>> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        let origins: Vec<String> = serde_json::from_str(raw)
            .map_err(|e| PlannerError::Config(format!("BACKEND_CORS_ORIGINS is invalid: {}", e)))?;
        return Ok(origins);
    }

    Ok(raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect())
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
