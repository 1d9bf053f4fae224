//! Error types for the trip planner.

use std::time::Duration;

/// Problems reading `TRIP_PLANNER_*` / `GEMINI_API_KEY` settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Could not open database: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Stored document is malformed: {0}")]
    Serialization(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} was already started")]
    AlreadyStarted { name: String },

    #[error("Failed to write to channel {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures talking to a text-generation provider.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),
}
