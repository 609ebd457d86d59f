//! Node-graph validation.
//!
//! The original player had no cycle guard and would loop forever on a
//! malformed graph. Content is therefore validated at import time: every edge
//! must land on an existing node, the graph must contain a `start` node and
//! at least one `end` node, and every path must be acyclic so traversal is
//! depth-bounded by the node count.

use std::collections::HashMap;

use thiserror::Error;

use crate::scenario::{Node, START_NODE_ID, Scenario};

/// A structural defect in a scenario graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// No node with id `start` exists.
    #[error("scenario has no `{START_NODE_ID}` node")]
    MissingStart,

    /// Two nodes share an id.
    #[error("duplicate node id `{0}`")]
    DuplicateNodeId(String),

    /// An edge points at a node id that does not exist.
    #[error("node `{from}` references missing node `{to}`")]
    DanglingEdge {
        /// The node carrying the reference.
        from: String,
        /// The missing destination id.
        to: String,
    },

    /// The graph contains no terminal node.
    #[error("scenario has no end node")]
    MissingEnd,

    /// A path revisits a node, so traversal would never terminate.
    #[error("cycle detected through node `{0}`")]
    CycleDetected(String),

    /// A question node offers no options to pick.
    #[error("question node `{0}` has no options")]
    EmptyQuestion(String),
}

/// Arena view of a scenario's nodes, keyed by id.
#[derive(Debug)]
pub struct NodeGraph<'a> {
    nodes: HashMap<&'a str, &'a Node>,
}

impl<'a> NodeGraph<'a> {
    /// Builds the arena, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNodeId`] when two nodes share an id.
    pub fn build(scenario: &'a Scenario) -> Result<Self, GraphError> {
        let mut nodes = HashMap::with_capacity(scenario.nodes.len());
        for node in &scenario.nodes {
            if nodes.insert(node.id(), node).is_some() {
                return Err(GraphError::DuplicateNodeId(node.id().to_owned()));
            }
        }
        Ok(Self { nodes })
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.nodes.get(id).copied()
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validates the full graph: start node present, all edges resolvable,
    /// at least one end node, every question answerable, and no cycles
    /// reachable from `start`.
    ///
    /// # Errors
    ///
    /// Returns the first structural defect found.
    pub fn validate(&self) -> Result<(), GraphError> {
        if !self.nodes.contains_key(START_NODE_ID) {
            return Err(GraphError::MissingStart);
        }
        if !self.nodes.values().any(|n| n.is_end()) {
            return Err(GraphError::MissingEnd);
        }
        for node in self.nodes.values() {
            if let Node::Question { id, options, .. } = node {
                if options.is_empty() {
                    return Err(GraphError::EmptyQuestion(id.clone()));
                }
            }
            for succ in node.successors() {
                if !self.nodes.contains_key(succ) {
                    return Err(GraphError::DanglingEdge {
                        from: node.id().to_owned(),
                        to: succ.to_owned(),
                    });
                }
            }
        }
        self.check_acyclic()
    }

    /// Depth-first search from `start` with the classic three colors.
    fn check_acyclic(&self) -> Result<(), GraphError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut colors: HashMap<&str, Color> =
            self.nodes.keys().map(|&id| (id, Color::White)).collect();
        // Stack entries: (node id, next successor index to visit).
        let mut stack: Vec<(&str, usize)> = vec![(START_NODE_ID, 0)];
        colors.insert(START_NODE_ID, Color::Gray);

        while let Some((id, idx)) = stack.pop() {
            let node = self
                .node(id)
                .ok_or_else(|| GraphError::DanglingEdge {
                    from: id.to_owned(),
                    to: id.to_owned(),
                })?;
            let succs = node.successors();
            if idx < succs.len() {
                stack.push((id, idx + 1));
                let succ = succs[idx];
                match colors.get(succ).copied() {
                    Some(Color::Gray) => {
                        return Err(GraphError::CycleDetected(succ.to_owned()));
                    }
                    Some(Color::White) => {
                        colors.insert(succ, Color::Gray);
                        stack.push((succ, 0));
                    }
                    // Black or unknown (dangling edges are caught by validate).
                    _ => {}
                }
            } else {
                colors.insert(id, Color::Black);
            }
        }
        Ok(())
    }

    /// Verification walk: starting at `start` and always taking the first
    /// option of every question, the walk must reach an end node within
    /// `|nodes|` steps. Returns the id of the end node reached.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CycleDetected`] when the step budget is exhausted
    /// and [`GraphError::DanglingEdge`] when an edge cannot be followed.
    pub fn prove_first_option_termination(&self) -> Result<String, GraphError> {
        let mut current = self.node(START_NODE_ID).ok_or(GraphError::MissingStart)?;
        for _ in 0..self.len() {
            if current.is_end() {
                return Ok(current.id().to_owned());
            }
            let next_id = current
                .successors()
                .first()
                .copied()
                .map(str::to_owned)
                .ok_or_else(|| GraphError::EmptyQuestion(current.id().to_owned()))?;
            current = self.node(&next_id).ok_or_else(|| GraphError::DanglingEdge {
                from: current.id().to_owned(),
                to: next_id.clone(),
            })?;
        }
        if current.is_end() {
            return Ok(current.id().to_owned());
        }
        Err(GraphError::CycleDetected(current.id().to_owned()))
    }
}

/// Validates a scenario's graph in one call.
///
/// # Errors
///
/// Returns the first structural defect found.
pub fn validate_scenario(scenario: &Scenario) -> Result<(), GraphError> {
    NodeGraph::build(scenario)?.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{EndContent, EndResult, MessageContent, QuestionContent, QuestionOption};
    use uuid::Uuid;

    fn message(id: &str, next: &str) -> Node {
        Node::Message {
            id: id.to_owned(),
            content_en: MessageContent::default(),
            content_id: None,
            channel: crate::scenario::Channel::EmailInbox,
            next: next.to_owned(),
        }
    }

    fn question(id: &str, nexts: &[&str]) -> Node {
        Node::Question {
            id: id.to_owned(),
            content_en: QuestionContent::default(),
            content_id: None,
            options: nexts
                .iter()
                .map(|n| QuestionOption {
                    text: format!("to {n}"),
                    text_id: None,
                    score_impact: 0,
                    next: (*n).to_owned(),
                })
                .collect(),
        }
    }

    fn end(id: &str) -> Node {
        Node::End {
            id: id.to_owned(),
            result: EndResult::Success,
            content_en: EndContent::default(),
            content_id: None,
        }
    }

    fn scenario(nodes: Vec<Node>) -> Scenario {
        Scenario {
            id: Uuid::new_v4(),
            title: "t".to_owned(),
            description: String::new(),
            difficulty: "easy".to_owned(),
            cialdini_categories: vec![],
            estimated_time: 5,
            nodes,
        }
    }

    #[test]
    fn test_valid_graph_passes() {
        let s = scenario(vec![
            message("start", "q1"),
            question("q1", &["e1", "e2"]),
            end("e1"),
            end("e2"),
        ]);
        assert!(validate_scenario(&s).is_ok());
    }

    #[test]
    fn test_missing_start_is_rejected() {
        let s = scenario(vec![message("intro", "e1"), end("e1")]);
        assert_eq!(validate_scenario(&s), Err(GraphError::MissingStart));
    }

    #[test]
    fn test_dangling_edge_is_rejected() {
        let s = scenario(vec![message("start", "nowhere"), end("e1")]);
        assert_eq!(
            validate_scenario(&s),
            Err(GraphError::DanglingEdge {
                from: "start".to_owned(),
                to: "nowhere".to_owned(),
            })
        );
    }

    #[test]
    fn test_cycle_is_detected() {
        let s = scenario(vec![
            message("start", "a"),
            message("a", "b"),
            message("b", "a"),
            end("e1"),
        ]);
        assert_eq!(
            validate_scenario(&s),
            Err(GraphError::CycleDetected("a".to_owned()))
        );
    }

    #[test]
    fn test_self_loop_is_detected() {
        let s = scenario(vec![message("start", "start"), end("e1")]);
        assert!(matches!(
            validate_scenario(&s),
            Err(GraphError::CycleDetected(_))
        ));
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let s = scenario(vec![message("start", "e1"), message("start", "e1"), end("e1")]);
        assert_eq!(
            validate_scenario(&s),
            Err(GraphError::DuplicateNodeId("start".to_owned()))
        );
    }

    #[test]
    fn test_empty_question_is_rejected() {
        let s = scenario(vec![message("start", "q1"), question("q1", &[]), end("e1")]);
        assert_eq!(
            validate_scenario(&s),
            Err(GraphError::EmptyQuestion("q1".to_owned()))
        );
    }

    #[test]
    fn test_first_option_walk_terminates_within_node_count() {
        let s = scenario(vec![
            message("start", "q1"),
            question("q1", &["m1", "e2"]),
            message("m1", "e1"),
            end("e1"),
            end("e2"),
        ]);
        let graph = NodeGraph::build(&s).unwrap();
        assert_eq!(graph.prove_first_option_termination().unwrap(), "e1");
    }

    #[test]
    fn test_first_option_walk_flags_cycle_instead_of_looping() {
        let s = scenario(vec![
            message("start", "a"),
            message("a", "start"),
            end("e1"),
        ]);
        let graph = NodeGraph::build(&s).unwrap();
        assert!(matches!(
            graph.prove_first_option_termination(),
            Err(GraphError::CycleDetected(_))
        ));
    }
}
