//! Domain layer for the Simulation Run context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod player;
