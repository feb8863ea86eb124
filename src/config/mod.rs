use std::env;
use std::fmt;

/// Hour (UTC) after which a day's leaderboard becomes visible. The product
/// settled on 18:00; keep overrides in configuration, never inline.
pub const DEFAULT_RELEASE_HOUR: u32 = 18;

/// Bounded optimistic-concurrency retries before a write surfaces `Conflict`.
pub const DEFAULT_COMMIT_ATTEMPTS: u32 = 4;

/// Point grant applied when a progress record is created at sign-up.
pub const DEFAULT_STARTING_POINTS: u32 = 5;

/// Top-level configuration for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub release_hour: u32,
    pub max_commit_attempts: u32,
    pub starting_points: u32,
    pub telemetry: TelemetryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            release_hour: DEFAULT_RELEASE_HOUR,
            max_commit_attempts: DEFAULT_COMMIT_ATTEMPTS,
            starting_points: DEFAULT_STARTING_POINTS,
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

impl EngineConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let release_hour = env::var("STYLEBOARD_RELEASE_HOUR")
            .unwrap_or_else(|_| DEFAULT_RELEASE_HOUR.to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidReleaseHour)?;
        if release_hour > 23 {
            return Err(ConfigError::InvalidReleaseHour);
        }

        let max_commit_attempts = env::var("STYLEBOARD_COMMIT_ATTEMPTS")
            .unwrap_or_else(|_| DEFAULT_COMMIT_ATTEMPTS.to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidCommitAttempts)?;
        if max_commit_attempts == 0 {
            return Err(ConfigError::InvalidCommitAttempts);
        }

        let starting_points = env::var("STYLEBOARD_STARTING_POINTS")
            .unwrap_or_else(|_| DEFAULT_STARTING_POINTS.to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidStartingPoints)?;

        let log_level = env::var("STYLEBOARD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            release_hour,
            max_commit_attempts,
            starting_points,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidReleaseHour,
    InvalidCommitAttempts,
    InvalidStartingPoints,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidReleaseHour => {
                write!(f, "STYLEBOARD_RELEASE_HOUR must be an hour in 0..=23")
            }
            ConfigError::InvalidCommitAttempts => {
                write!(f, "STYLEBOARD_COMMIT_ATTEMPTS must be a positive integer")
            }
            ConfigError::InvalidStartingPoints => {
                write!(f, "STYLEBOARD_STARTING_POINTS must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
