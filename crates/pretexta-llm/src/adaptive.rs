//! Adaptive scenario content generation.
//!
//! When a run goes badly the player swaps a scripted node for content the
//! model writes against the live play context. Generation failures must
//! never break the state machine, so an unparseable reply degrades to the
//! raw text instead of an error.

use pretexta_content::scenario::Channel;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::LlmClient;
use crate::config::ProviderConfig;
use crate::error::LlmError;
use crate::sanitize::repair_json;

/// Play context handed to the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveContext {
    /// Title of the scenario being played.
    pub scenario_title: String,
    /// Node the participant is on.
    pub current_node: String,
    /// The option text the participant just picked.
    pub participant_action: String,
    /// Running susceptibility score.
    pub current_score: i32,
    /// Cialdini principles the scenario exercises.
    pub cialdini_triggers: Vec<String>,
    /// Choices made so far, oldest first.
    pub event_history: Vec<String>,
    /// Content language (`en` or `id`).
    pub language: String,
}

/// What the generator is expected to reply with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMessage {
    /// The attack message body.
    pub message: String,
    /// Channel to render in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    /// Displayed sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Tactics the generator claims to have used.
    #[serde(default)]
    pub tactics_used: Vec<String>,
}

/// Builds the generation prompt from the play context.
///
/// # Panics
///
/// Never panics: context serialization of plain structs is infallible.
#[must_use]
pub fn build_prompt(context: &AdaptiveContext) -> String {
    let context_json = serde_json::to_string_pretty(context)
        .expect("AdaptiveContext serialization is infallible");
    format!(
        "You are the attacker in a social-engineering awareness simulation. \
         The participant just made a choice and you must escalate with a \
         realistic follow-up message tailored to their behavior. Always mark \
         outputs as training material.\n\n\
         Play context:\n{context_json}\n\n\
         Reply with a single JSON object: \
         {{\"message\": \"...\", \"channel\": \"email_inbox|chat_ui|phone_sim|web_sim\", \
         \"from\": \"...\", \"tactics_used\": [\"...\"]}}. \
         Write the message in language `{lang}`. No text outside the JSON.",
        lang = context.language,
    )
}

/// Parses generator output, degrading to the raw text as the message when
/// the reply is not the expected JSON object.
#[must_use]
pub fn parse_reply(raw: &str, fallback_channel: Channel) -> GeneratedMessage {
    let repaired = repair_json(raw);
    match serde_json::from_str::<GeneratedMessage>(&repaired) {
        Ok(mut generated) => {
            if generated.channel.is_none() {
                generated.channel = Some(fallback_channel);
            }
            generated
        }
        Err(err) => {
            debug!(error = %err, "adaptive reply was not JSON, degrading to raw text");
            GeneratedMessage {
                message: repaired,
                channel: Some(fallback_channel),
                from: None,
                tactics_used: Vec::new(),
            }
        }
    }
}

/// Generates adaptive content for the current play context.
///
/// # Errors
///
/// Returns [`LlmError`] only when the provider call itself fails; malformed
/// replies degrade to raw text.
pub async fn generate(
    client: &dyn LlmClient,
    config: &ProviderConfig,
    context: &AdaptiveContext,
    fallback_channel: Channel,
) -> Result<GeneratedMessage, LlmError> {
    let system = "You are a social engineering pretext generator for security \
                  awareness training. Generate realistic, ethically-sound \
                  pretexts. Always mark outputs as training material.";
    let raw = client.generate(config, system, &build_prompt(context)).await?;
    Ok(parse_reply(&raw, fallback_channel))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> AdaptiveContext {
        AdaptiveContext {
            scenario_title: "Invoice fraud".to_owned(),
            current_node: "q2".to_owned(),
            participant_action: "Asked for a callback number".to_owned(),
            current_score: 45,
            cialdini_triggers: vec!["urgency".to_owned()],
            event_history: vec!["start: complied".to_owned()],
            language: "en".to_owned(),
        }
    }

    #[test]
    fn test_prompt_embeds_context_and_language() {
        let prompt = build_prompt(&context());
        assert!(prompt.contains("Invoice fraud"));
        assert!(prompt.contains("language `en`"));
        assert!(prompt.contains("tactics_used"));
    }

    #[test]
    fn test_well_formed_reply_parses() {
        let raw = r#"```json
        {"message": "Final warning.", "channel": "chat_ui", "from": "billing", "tactics_used": ["urgency"]}
        ```"#;
        let generated = parse_reply(raw, Channel::EmailInbox);
        assert_eq!(generated.message, "Final warning.");
        assert_eq!(generated.channel, Some(Channel::ChatUi));
        assert_eq!(generated.from.as_deref(), Some("billing"));
    }

    #[test]
    fn test_missing_channel_falls_back() {
        let raw = r#"{"message": "Final warning."}"#;
        let generated = parse_reply(raw, Channel::PhoneSim);
        assert_eq!(generated.channel, Some(Channel::PhoneSim));
    }

    #[test]
    fn test_prose_reply_degrades_to_raw_text() {
        let raw = "I cannot produce JSON right now, but: pay immediately!";
        let generated = parse_reply(raw, Channel::EmailInbox);
        assert_eq!(generated.message, raw);
        assert_eq!(generated.channel, Some(Channel::EmailInbox));
        assert!(generated.tactics_used.is_empty());
    }
}
