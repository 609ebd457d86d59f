//! Scenario content model.
//!
//! A scenario is a directed graph of dialogue nodes. Traversal always begins
//! at the node with id `start`; `end` nodes are terminal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Id of the node every traversal begins at.
pub const START_NODE_ID: &str = "start";

/// Delivery channel a message node is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Simulated email inbox.
    #[default]
    EmailInbox,
    /// Simulated chat client.
    ChatUi,
    /// Simulated phone call.
    PhoneSim,
    /// Simulated web page.
    WebSim,
}

/// Localized body of a message-style node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MessageContent {
    /// Subject line (email-style channels).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Displayed sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Message body.
    #[serde(default)]
    pub body: String,
}

/// Localized text of a question node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuestionContent {
    /// The question shown to the participant.
    #[serde(default)]
    pub text: String,
}

/// One selectable answer on a question node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// English option text.
    pub text: String,
    /// Optional Indonesian option text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_id: Option<String>,
    /// Delta applied to the susceptibility score when chosen.
    #[serde(default)]
    pub score_impact: i32,
    /// Id of the node this option leads to.
    pub next: String,
}

/// Outcome recorded on an end node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndResult {
    /// The participant resisted the attack.
    Success,
    /// The participant was manipulated.
    Failure,
}

/// Localized text of an end node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EndContent {
    /// Headline shown on the result card.
    #[serde(default)]
    pub title: String,
    /// Debrief explaining the outcome.
    #[serde(default)]
    pub explanation: String,
}

/// A node in the scenario graph, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Display-only message; the single transition is "continue".
    Message {
        /// Node id, unique within the scenario.
        id: String,
        /// English content.
        content_en: MessageContent,
        /// Optional Indonesian content.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_id: Option<MessageContent>,
        /// Channel the message is rendered in.
        #[serde(default)]
        channel: Channel,
        /// Id of the following node.
        next: String,
    },
    /// Decision point; each option carries a score delta and a destination.
    Question {
        /// Node id, unique within the scenario.
        id: String,
        /// English content.
        content_en: QuestionContent,
        /// Optional Indonesian content.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_id: Option<QuestionContent>,
        /// Selectable answers.
        options: Vec<QuestionOption>,
    },
    /// Like `Message`, but the content is synthesized by the LLM at play time.
    AiAdaptive {
        /// Node id, unique within the scenario.
        id: String,
        /// Static fallback content shown when generation degrades.
        #[serde(default)]
        content_en: MessageContent,
        /// Optional Indonesian fallback content.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_id: Option<MessageContent>,
        /// Channel the message is rendered in.
        #[serde(default)]
        channel: Channel,
        /// Id of the following node.
        next: String,
    },
    /// Terminal node.
    End {
        /// Node id, unique within the scenario.
        id: String,
        /// Outcome of the run.
        result: EndResult,
        /// English content.
        content_en: EndContent,
        /// Optional Indonesian content.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_id: Option<EndContent>,
    },
}

impl Node {
    /// Returns the node id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Node::Message { id, .. }
            | Node::Question { id, .. }
            | Node::AiAdaptive { id, .. }
            | Node::End { id, .. } => id,
        }
    }

    /// Returns `true` for terminal nodes.
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Node::End { .. })
    }

    /// The ids of every node reachable in one step.
    #[must_use]
    pub fn successors(&self) -> Vec<&str> {
        match self {
            Node::Message { next, .. } | Node::AiAdaptive { next, .. } => vec![next.as_str()],
            Node::Question { options, .. } => {
                options.iter().map(|o| o.next.as_str()).collect()
            }
            Node::End { .. } => Vec::new(),
        }
    }
}

/// A scripted social-engineering scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Short description for the catalog.
    pub description: String,
    /// Difficulty label (easy, medium, hard).
    pub difficulty: String,
    /// Cialdini persuasion principles this scenario exercises.
    #[serde(default)]
    pub cialdini_categories: Vec<String>,
    /// Estimated play time in minutes.
    #[serde(default)]
    pub estimated_time: u32,
    /// The dialogue graph.
    pub nodes: Vec<Node>,
}

impl Scenario {
    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }
}
