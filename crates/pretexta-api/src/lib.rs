//! Pretexta — HTTP API server.
//!
//! Exposes the REST contract of the platform: auth, content catalogs,
//! simulation runs, quiz history, the LLM proxy, reports, and YAML import.

pub mod auth;
pub mod error;
pub mod routes;
pub mod settings;
pub mod state;
