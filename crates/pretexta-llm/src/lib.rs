//! LLM proxy layer.
//!
//! Everything that touches a language model lives here: provider
//! configuration with key masking, the outbound client, output sanitation
//! and JSON repair, adaptive scenario content, the attacker-chat roleplay,
//! and the AI-challenge normalizer.

pub mod adaptive;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod personas;
pub mod sanitize;
