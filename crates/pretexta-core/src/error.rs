//! Errors shared across the domain crates.

use thiserror::Error;
use uuid::Uuid;

/// Failures a command or query can surface.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No event stream exists for the requested id.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// The stream moved on while the command was in flight.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// Stream that rejected the append.
        aggregate_id: Uuid,
        /// Version the writer loaded.
        expected: i64,
        /// Version the store actually holds.
        actual: i64,
    },

    /// The request contradicts a domain rule.
    #[error("validation error: {0}")]
    Validation(String),

    /// The store or another dependency failed.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
