//! Event contract and envelope metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope fields stamped on every event before it is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Globally unique id of this event.
    pub event_id: Uuid,
    /// Name the payload deserializes under.
    pub event_type: String,
    /// Stream the event belongs to (the run id, for simulation events).
    pub aggregate_id: Uuid,
    /// Position within the stream, starting at 1.
    pub sequence_number: i64,
    /// Shared by every event one command produced.
    pub correlation_id: Uuid,
    /// The event or command directly responsible for this one.
    pub causation_id: Uuid,
    /// When the event was created.
    pub occurred_at: DateTime<Utc>,
}

/// Behavior every persisted event provides.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Name the payload serializes under.
    fn event_type(&self) -> &'static str;

    /// The JSON payload written to the store.
    fn to_payload(&self) -> serde_json::Value;

    /// The envelope metadata.
    fn metadata(&self) -> &EventMetadata;
}
