//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default model for conversational replies.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash";

/// Default model for full itinerary generation.
pub const DEFAULT_ITINERARY_MODEL: &str = "gemini-1.5-pro";

/// Planner configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub api_key: SecretString,
    pub chat_model: String,
    pub itinerary_model: String,
    pub db_path: PathBuf,
    pub http_port: u16,
    /// Number of prior transcript entries sent along with each reply prompt.
    pub context_turns: usize,
    /// Upper bound on a single generation call.
    pub generation_timeout: Duration,
    /// When set, logs go to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl PlannerConfig {
    /// Build config from environment variables.
    ///
    /// `GEMINI_API_KEY` is required; everything else has a default. Numeric
    /// values that fail to parse fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "GEMINI_API_KEY".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        let chat_model = std::env::var("TRIP_PLANNER_MODEL")
            .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());

        let itinerary_model = std::env::var("TRIP_PLANNER_ITINERARY_MODEL")
            .unwrap_or_else(|_| DEFAULT_ITINERARY_MODEL.to_string());

        let db_path = std::env::var("TRIP_PLANNER_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/trip-planner.db"));

        let http_port: u16 = std::env::var("TRIP_PLANNER_HTTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let context_turns: usize = std::env::var("TRIP_PLANNER_CONTEXT_TURNS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(6);

        let timeout_secs: u64 = std::env::var("TRIP_PLANNER_GENERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(60);

        let log_file = std::env::var("TRIP_PLANNER_LOG_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api_key: SecretString::from(api_key),
            chat_model,
            itinerary_model,
            db_path,
            http_port,
            context_turns,
            generation_timeout: Duration::from_secs(timeout_secs),
            log_file,
        })
    }
}

/// Tunables for a single conversation session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub context_turns: usize,
    pub generation_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            context_turns: 6,
            generation_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&PlannerConfig> for SessionConfig {
    fn from(config: &PlannerConfig) -> Self {
        Self {
            context_turns: config.context_turns,
            generation_timeout: config.generation_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.context_turns, 6);
        assert_eq!(config.generation_timeout, Duration::from_secs(60));
    }
}
