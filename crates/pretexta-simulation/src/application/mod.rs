//! Application layer for the Simulation Run context.

pub mod command_handlers;
pub mod query_handlers;
pub mod reports;
