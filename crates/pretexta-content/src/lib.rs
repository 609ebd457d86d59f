//! Pretexta — Training Content bounded context.
//!
//! Scripted scenarios (branching node graphs), quizzes, graph validation,
//! and YAML import. Content is immutable during play.

pub mod graph;
pub mod import;
pub mod quiz;
pub mod scenario;
pub mod store;
