//! Pretexta — Simulation Run bounded context.
//!
//! Responsible for playing scenarios (the branching-node state machine),
//! recording traversal events, scoring, completion, and report generation.

pub mod application;
pub mod domain;
