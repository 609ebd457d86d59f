//! Shared test mocks and utilities for Pretexta.

mod clock;
mod llm;
mod repository;

pub use clock::FixedClock;
pub use llm::CannedLlmClient;
pub use repository::{
    EmptyEventRepository, FailingEventRepository, InMemoryEventRepository,
    RecordingEventRepository,
};
