//! Per-user progress records, the append-only submission ledger, and the
//! storage seams both sit behind.

pub mod domain;
pub mod store;

pub use domain::{FeatureId, SubmissionId, SubmissionRecord, UserId, UserProgress};
pub use store::{
    MemoryProgressStore, MemorySubmissionLedger, ProgressStore, StoreError, SubmissionLedger,
    VersionedProgress,
};
