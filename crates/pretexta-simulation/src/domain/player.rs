//! The scenario-player state machine.
//!
//! States are node ids of the scenario graph. The player resumes from the
//! last recorded traversal step, applies clamped score deltas for question
//! choices, decides when adaptive LLM content must replace a static node,
//! and keeps a non-committing rewind stack: rewinding re-enters the prior
//! node without undoing anything already persisted.

use thiserror::Error;

use pretexta_content::scenario::{Channel, EndResult, MessageContent, Node, START_NODE_ID, Scenario};

use super::events::TraversalStep;

/// Running scores are always kept inside `0..=100`.
#[must_use]
pub fn clamp_score(score: i32) -> i32 {
    score.clamp(0, 100)
}

/// Below this score a plain message destination is handed to the LLM for
/// adaptive content instead of its scripted text.
pub const ADAPTIVE_SCORE_THRESHOLD: i32 = 50;

/// A traversal failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    /// The scenario has no node with this id.
    #[error("unknown node `{0}`")]
    UnknownNode(String),

    /// A question transition was requested on a non-question node.
    #[error("node `{0}` is not a question")]
    NotAQuestion(String),

    /// A continue transition was requested on a node without a `next`.
    #[error("node `{0}` has no continue transition")]
    NoContinue(String),

    /// The chosen option index does not exist.
    #[error("node `{node}` has no option {index}")]
    NoSuchOption {
        /// The question node.
        node: String,
        /// The out-of-range index.
        index: usize,
    },

    /// The run already reached an end node.
    #[error("scenario is finished")]
    Finished,

    /// A posted step contradicts the scenario graph.
    #[error("step at `{node}` does not match choice `{action}` in the scenario")]
    StepMismatch {
        /// The question node the step claims.
        node: String,
        /// The claimed option text.
        action: String,
    },
}

/// What a choice produced: the step to persist, the new score, and whether
/// the destination's content must be generated instead of rendered as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOutcome {
    /// The traversal step, minus its timestamp (the aggregate stamps it).
    pub node_id: String,
    /// Chosen option text.
    pub action: String,
    /// Score delta of the chosen option.
    pub score_impact: i32,
    /// Destination node id.
    pub next_node: String,
    /// Running score after the clamped delta.
    pub score_after: i32,
    /// The destination content must be LLM-generated.
    pub adaptive: bool,
    /// The run just reached an end node.
    pub reached_end: Option<EndResult>,
}

/// Adaptive content returned by the LLM proxy, ready to splice into the
/// graph in place of a static node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptiveContent {
    /// The attack message body.
    pub message: String,
    /// Channel to render in; defaults to the replaced node's channel.
    pub channel: Option<Channel>,
    /// Displayed sender.
    pub from: Option<String>,
    /// Tactics the generator claims to have used.
    pub tactics_used: Vec<String>,
}

/// The scenario-player state machine.
#[derive(Debug)]
pub struct ScenarioPlayer<'a> {
    scenario: &'a Scenario,
    current: String,
    score: i32,
    history: Vec<String>,
}

impl<'a> ScenarioPlayer<'a> {
    /// Starts a fresh play-through at the `start` node.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::UnknownNode`] when the scenario has no `start`.
    pub fn start(scenario: &'a Scenario, initial_score: i32) -> Result<Self, PlayerError> {
        Self::at(scenario, START_NODE_ID, initial_score)
    }

    /// Resumes an in-progress run: the current node is the last recorded
    /// step's `next_node`, or `start` when nothing was recorded yet.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::UnknownNode`] when the resume target is gone.
    pub fn resume(
        scenario: &'a Scenario,
        steps: &[TraversalStep],
        score: i32,
    ) -> Result<Self, PlayerError> {
        let node_id = steps
            .last()
            .map_or(START_NODE_ID, |step| step.next_node.as_str());
        Self::at(scenario, node_id, score)
    }

    fn at(scenario: &'a Scenario, node_id: &str, score: i32) -> Result<Self, PlayerError> {
        if scenario.node(node_id).is_none() {
            return Err(PlayerError::UnknownNode(node_id.to_owned()));
        }
        Ok(Self {
            scenario,
            current: node_id.to_owned(),
            score: clamp_score(score),
            history: Vec::new(),
        })
    }

    /// The node the player is on.
    ///
    /// # Panics
    ///
    /// Never panics: the current id is validated on every transition.
    #[must_use]
    pub fn current_node(&self) -> &'a Node {
        self.scenario
            .node(&self.current)
            .expect("current node id is validated on every transition")
    }

    /// Running susceptibility score.
    #[must_use]
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Whether the player stands on an end node.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current_node().is_end()
    }

    /// Outcome of the run, once on an end node.
    #[must_use]
    pub fn end_result(&self) -> Option<EndResult> {
        match self.current_node() {
            Node::End { result, .. } => Some(*result),
            _ => None,
        }
    }

    /// The only transition on a message node: advance to `next`. No score
    /// change and nothing to persist.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::NoContinue`] on question/end nodes and
    /// [`PlayerError::UnknownNode`] on a dangling edge.
    pub fn continue_message(&mut self) -> Result<&'a Node, PlayerError> {
        let next = match self.current_node() {
            Node::Message { next, .. } | Node::AiAdaptive { next, .. } => next.clone(),
            node => return Err(PlayerError::NoContinue(node.id().to_owned())),
        };
        self.step_to(&next)
    }

    /// Picks option `index` on the current question node.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Finished`] on an end node,
    /// [`PlayerError::NotAQuestion`] on message nodes,
    /// [`PlayerError::NoSuchOption`] for an out-of-range index, and
    /// [`PlayerError::UnknownNode`] on a dangling edge.
    pub fn choose(&mut self, index: usize) -> Result<ChoiceOutcome, PlayerError> {
        if self.is_finished() {
            return Err(PlayerError::Finished);
        }
        let (node_id, option) = match self.current_node() {
            Node::Question { id, options, .. } => {
                let option = options.get(index).ok_or_else(|| PlayerError::NoSuchOption {
                    node: id.clone(),
                    index,
                })?;
                (id.clone(), option.clone())
            }
            node => return Err(PlayerError::NotAQuestion(node.id().to_owned())),
        };

        let score_after = clamp_score(self.score + option.score_impact);
        let destination = self.step_to(&option.next)?;
        self.score = score_after;

        Ok(ChoiceOutcome {
            node_id,
            action: option.text.clone(),
            score_impact: option.score_impact,
            next_node: option.next.clone(),
            score_after,
            adaptive: needs_adaptive(destination, score_after),
            reached_end: match destination {
                Node::End { result, .. } => Some(*result),
                _ => None,
            },
        })
    }

    /// Pops the rewind stack and re-enters the previous node. Client-side
    /// only: persisted events and score stay as they are.
    pub fn rewind(&mut self) -> Option<&'a Node> {
        let previous = self.history.pop()?;
        self.current = previous;
        Some(self.current_node())
    }

    fn step_to(&mut self, next: &str) -> Result<&'a Node, PlayerError> {
        let destination = self
            .scenario
            .node(next)
            .ok_or_else(|| PlayerError::UnknownNode(next.to_owned()))?;
        self.history.push(self.current.clone());
        self.current = next.to_owned();
        Ok(destination)
    }
}

/// Replays client-posted steps against the scenario graph on top of the
/// already-recorded ones and rejects any that contradict it: wrong node
/// order, unknown options, tampered score deltas or destinations. Steps on
/// synthetic `ai_` nodes are not checkable; the walk re-enters the graph at
/// their recorded exit.
///
/// # Errors
///
/// Returns [`PlayerError`] for the first step that does not replay.
pub fn verify_steps(
    scenario: &Scenario,
    recorded: &[TraversalStep],
    score: i32,
    posted: &[TraversalStep],
) -> Result<(), PlayerError> {
    let mut player = ScenarioPlayer::resume(scenario, recorded, score)?;
    for step in posted {
        if scenario.node(&step.node_id).is_none() && step.node_id.starts_with("ai_") {
            player =
                ScenarioPlayer::resume(scenario, std::slice::from_ref(step), player.score())?;
            continue;
        }
        // Message nodes auto-advance without recording a step.
        let mut hops = scenario.nodes.len();
        while player.current_node().id() != step.node_id {
            if hops == 0 {
                return Err(PlayerError::UnknownNode(step.node_id.clone()));
            }
            player.continue_message()?;
            hops -= 1;
        }
        let options = match player.current_node() {
            Node::Question { options, .. } => options,
            node => return Err(PlayerError::NotAQuestion(node.id().to_owned())),
        };
        let index = options
            .iter()
            .position(|option| option.text == step.action)
            .ok_or_else(|| PlayerError::StepMismatch {
                node: step.node_id.clone(),
                action: step.action.clone(),
            })?;
        let outcome = player.choose(index)?;
        if outcome.score_impact != step.score_impact || outcome.next_node != step.next_node {
            return Err(PlayerError::StepMismatch {
                node: step.node_id.clone(),
                action: step.action.clone(),
            });
        }
    }
    Ok(())
}

/// Adaptive generation triggers when the destination is an `ai_adaptive`
/// node, or when the score has dropped below the threshold and the
/// destination is a plain message.
#[must_use]
pub fn needs_adaptive(destination: &Node, score: i32) -> bool {
    match destination {
        Node::AiAdaptive { .. } => true,
        Node::Message { .. } => score < ADAPTIVE_SCORE_THRESHOLD,
        _ => false,
    }
}

/// Splices LLM content into a synthetic node shown in place of `node`.
/// The synthetic id is `ai_<millis>`.
#[must_use]
pub fn splice_adaptive(node: &Node, content: &AdaptiveContent, now_millis: i64) -> Node {
    let (channel, next) = match node {
        Node::Message { channel, next, .. } | Node::AiAdaptive { channel, next, .. } => {
            (*channel, next.clone())
        }
        // Only message-like nodes are replaced; fall back to defaults.
        _ => (Channel::EmailInbox, String::new()),
    };
    Node::Message {
        id: format!("ai_{now_millis}"),
        content_en: MessageContent {
            subject: None,
            from: content.from.clone(),
            body: content.message.clone(),
        },
        content_id: None,
        channel: content.channel.unwrap_or(channel),
        next,
    }
}
