//! Agents - named holders of a nonempty belief set.
//!
//! An agent's belief state is an ordered collection of interpretations it
//! considers equally plausible, not a single point belief. The state is
//! only ever replaced wholesale, at the commit boundary of a revision round.

use crate::interpretation::Interpretation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing or mutating an agent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    /// An agent's belief set must always hold at least one model.
    #[error("agent {0} would be left with an empty belief set")]
    EmptyBeliefSet(String),

    /// All models in a belief set must share one signature width.
    #[error("agent {agent} given models of widths {expected} and {actual}")]
    MixedWidths {
        agent: String,
        expected: usize,
        actual: usize,
    },
}

/// A named agent holding a nonempty set of equally-plausible models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    name: String,
    models: Vec<Interpretation>,
}

impl Agent {
    /// Creates an agent with the given belief set.
    ///
    /// Fails if the set is empty or mixes signature widths.
    pub fn new(name: impl Into<String>, models: Vec<Interpretation>) -> Result<Self, AgentError> {
        let name = name.into();
        validate_models(&name, &models)?;
        Ok(Self { name, models })
    }

    /// Creates an agent holding a single model.
    pub fn from_model(name: impl Into<String>, model: Interpretation) -> Self {
        Self {
            name: name.into(),
            models: vec![model],
        }
    }

    /// The agent's identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current belief set, in order.
    pub fn models(&self) -> &[Interpretation] {
        &self.models
    }

    /// The single representative model used by the analytic Markov model.
    ///
    /// By convention this is the first entry of the belief set.
    pub fn model(&self) -> &Interpretation {
        &self.models[0]
    }

    /// Atomically replaces the whole belief set.
    ///
    /// Fails without modifying the agent if the replacement is empty or
    /// mixes widths.
    pub fn update_beliefs(&mut self, models: Vec<Interpretation>) -> Result<(), AgentError> {
        validate_models(&self.name, &models)?;
        self.models = models;
        Ok(())
    }
}

fn validate_models(name: &str, models: &[Interpretation]) -> Result<(), AgentError> {
    let first = models
        .first()
        .ok_or_else(|| AgentError::EmptyBeliefSet(name.to_string()))?;

    for model in &models[1..] {
        if model.len() != first.len() {
            return Err(AgentError::MixedWidths {
                agent: name.to_string(),
                expected: first.len(),
                actual: model.len(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_belief_set() {
        assert_eq!(
            Agent::new("A", vec![]),
            Err(AgentError::EmptyBeliefSet("A".to_string()))
        );
    }

    #[test]
    fn test_new_rejects_mixed_widths() {
        let models = vec![
            Interpretation::from_bits(&[1, 0]),
            Interpretation::from_bits(&[1, 0, 1]),
        ];
        assert_eq!(
            Agent::new("A", models),
            Err(AgentError::MixedWidths {
                agent: "A".to_string(),
                expected: 2,
                actual: 3,
            })
        );
    }

    #[test]
    fn test_representative_is_first_model() {
        let models = vec![
            Interpretation::from_bits(&[1, 0, 0]),
            Interpretation::from_bits(&[1, 1, 1]),
        ];
        let agent = Agent::new("A", models).unwrap();
        assert_eq!(agent.model(), &Interpretation::from_bits(&[1, 0, 0]));
    }

    #[test]
    fn test_update_beliefs_replaces_wholesale() {
        let mut agent = Agent::from_model("A", Interpretation::from_bits(&[0, 0, 1]));
        agent
            .update_beliefs(vec![Interpretation::from_bits(&[1, 1, 1])])
            .unwrap();
        assert_eq!(agent.models(), &[Interpretation::from_bits(&[1, 1, 1])]);
    }

    #[test]
    fn test_failed_update_leaves_state_untouched() {
        let mut agent = Agent::from_model("A", Interpretation::from_bits(&[0, 0, 1]));
        assert!(agent.update_beliefs(vec![]).is_err());
        assert_eq!(agent.models(), &[Interpretation::from_bits(&[0, 0, 1])]);
    }
}
