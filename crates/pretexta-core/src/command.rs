//! Command contract.

use uuid::Uuid;

/// A state-changing request aimed at a single aggregate.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Name used in logs and for routing.
    fn command_type(&self) -> &'static str;

    /// Ties the command to every event it causes.
    fn correlation_id(&self) -> Uuid;
}
