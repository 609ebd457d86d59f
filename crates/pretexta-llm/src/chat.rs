//! Attacker-chat roleplay.
//!
//! The model plays an attacker persona against the participant. The system
//! prompt instructs it to emit `[SUCCESS_ATTACK]` when the participant falls
//! for the attack and `[ATTACK_FAILED]` when they shut it down; those markers
//! drive the session status and are stripped from the shown reply.

use serde::{Deserialize, Serialize};

use crate::client::{ChatMessage, LlmClient};
use crate::config::ProviderConfig;
use crate::error::LlmError;
use crate::personas::Persona;

/// Marker the model emits when the participant was manipulated.
pub const SUCCESS_ATTACK_MARKER: &str = "[SUCCESS_ATTACK]";
/// Marker the model emits when the participant blocked the attack.
pub const ATTACK_FAILED_MARKER: &str = "[ATTACK_FAILED]";

/// How the roleplay session stands after a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    /// The conversation continues.
    Ongoing,
    /// The participant fell for the attack.
    Failed,
    /// The participant blocked the attack.
    Completed,
}

/// One attacker reply with the verdict extracted from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// The reply shown to the participant, markers removed.
    pub content: String,
    /// Session status derived from the markers.
    pub status: ChatStatus,
}

/// Builds the roleplay system prompt from a persona.
#[must_use]
pub fn system_prompt(persona: &Persona) -> String {
    format!(
        "You are a roleplay actor in a cybersecurity awareness simulation.\n\
         Role: {name}\n\
         Goal: {goal}\n\
         Personality: {style}\n\
         Context: {context}\n\
         \n\
         INSTRUCTIONS:\n\
         1. Respond naturally as your character. Short, realistic messages (chat/email style).\n\
         2. Do NOT break character.\n\
         3. If the user spots the attack or refuses securely, react accordingly (get angry, give up, or try a different angle).\n\
         4. If the user FAILS (gives a password, clicks a link), output the marker {success} in your text.\n\
         5. If the user permanently BLOCKS the attack, output the marker {failed}.",
        name = persona.name,
        goal = persona.goal,
        style = persona.style,
        context = persona.context,
        success = SUCCESS_ATTACK_MARKER,
        failed = ATTACK_FAILED_MARKER,
    )
}

/// Scans a raw reply for status markers and strips them.
#[must_use]
pub fn extract_status(raw: &str) -> ChatReply {
    if raw.contains(SUCCESS_ATTACK_MARKER) {
        ChatReply {
            content: raw.replace(SUCCESS_ATTACK_MARKER, "").trim().to_owned(),
            status: ChatStatus::Failed,
        }
    } else if raw.contains(ATTACK_FAILED_MARKER) {
        ChatReply {
            content: raw.replace(ATTACK_FAILED_MARKER, "").trim().to_owned(),
            status: ChatStatus::Completed,
        }
    } else {
        ChatReply {
            content: raw.trim().to_owned(),
            status: ChatStatus::Ongoing,
        }
    }
}

/// Runs one chat turn against the model and extracts the verdict.
///
/// # Errors
///
/// Returns [`LlmError`] when the provider call fails.
pub async fn chat_turn(
    client: &dyn LlmClient,
    config: &ProviderConfig,
    persona: &Persona,
    history: &[ChatMessage],
    message: &str,
) -> Result<ChatReply, LlmError> {
    let raw = client
        .chat(config, &system_prompt(persona), history, message)
        .await?;
    Ok(extract_status(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personas;

    #[test]
    fn test_success_marker_means_participant_failed() {
        let reply = extract_status("Great, got it! [SUCCESS_ATTACK] Thanks.");
        assert_eq!(reply.status, ChatStatus::Failed);
        assert_eq!(reply.content, "Great, got it!  Thanks.".trim());
        assert!(!reply.content.contains(SUCCESS_ATTACK_MARKER));
    }

    #[test]
    fn test_failed_marker_means_participant_passed() {
        let reply = extract_status("[ATTACK_FAILED] Fine, forget it.");
        assert_eq!(reply.status, ChatStatus::Completed);
        assert_eq!(reply.content, "Fine, forget it.");
    }

    #[test]
    fn test_plain_reply_is_ongoing() {
        let reply = extract_status("Why can't you just confirm the address?");
        assert_eq!(reply.status, ChatStatus::Ongoing);
    }

    #[test]
    fn test_system_prompt_carries_persona_fields() {
        let persona = personas::find("ceo_urgent").unwrap();
        let prompt = system_prompt(&persona);
        assert!(prompt.contains("The Urgent CEO"));
        assert!(prompt.contains(SUCCESS_ATTACK_MARKER));
        assert!(prompt.contains(ATTACK_FAILED_MARKER));
    }
}
