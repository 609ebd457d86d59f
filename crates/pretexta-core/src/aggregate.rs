//! Event-sourced aggregate contract.

use uuid::Uuid;

use crate::event::DomainEvent;

/// An entity whose state is rebuilt by replaying its event stream.
pub trait AggregateRoot: Send + Sync {
    /// Event type the aggregate emits and replays.
    type Event: DomainEvent;

    /// Identifier of the stream this aggregate owns.
    fn aggregate_id(&self) -> Uuid;

    /// Number of events folded in so far.
    fn version(&self) -> i64;

    /// Folds one event into the in-memory state.
    fn apply(&mut self, event: &Self::Event);

    /// Events emitted by command handling that the store has not seen yet.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Drops the emitted events once they are persisted.
    fn clear_uncommitted_events(&mut self);
}
