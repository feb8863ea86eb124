use crate::progress::{StoreError, UserId};

/// Caller-visible failures of the engine's operations. Recovered-locally
/// failures (the top-3 rank lookup, leaderboard enrichment) are logged at the
/// call site and never surface through this enum.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no progress record for user {0}")]
    UnknownUser(UserId),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("write conflict persisted after {attempts} attempt(s)")]
    Conflict { attempts: u32 },
    #[error("insufficient points: have {available}, need {required}")]
    InsufficientPoints { available: u32, required: u32 },
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
