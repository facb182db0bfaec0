//! Belief bases - the model universe a theory induces.
//!
//! A `BeliefBase` pairs an ordered proposition signature with the list of
//! interpretations satisfying a theory over that signature. Formula parsing
//! is outside this crate's boundary: callers either hand over the models
//! directly or describe the theory as a predicate over interpretations.

use crate::interpretation::{Interpretation, InterpretationError};
use serde::{Deserialize, Serialize};

/// An ordered proposition signature plus the interpretations satisfying a
/// theory over it.
///
/// The model list is frozen at construction and keeps the enumeration order
/// it was built with; downstream code relies on that ordering for universe
/// indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeliefBase {
    propositions: Vec<String>,
    models: Vec<Interpretation>,
}

impl BeliefBase {
    /// Creates a belief base from an explicit model list.
    ///
    /// Every model must assign exactly the signature's propositions.
    pub fn from_models(
        propositions: Vec<String>,
        models: Vec<Interpretation>,
    ) -> Result<Self, InterpretationError> {
        let width = propositions.len();
        for model in &models {
            if model.len() != width {
                return Err(InterpretationError::LengthMismatch {
                    left: width,
                    right: model.len(),
                });
            }
        }

        Ok(Self {
            propositions,
            models,
        })
    }

    /// Creates a belief base by enumerating every interpretation of the
    /// signature and keeping those the predicate accepts.
    ///
    /// Enumeration is lexicographic with false < true and the first
    /// proposition most significant, so universe indices are stable across
    /// runs.
    pub fn from_predicate<F>(propositions: Vec<String>, satisfies: F) -> Self
    where
        F: Fn(&Interpretation) -> bool,
    {
        let n = propositions.len();
        let mut models = Vec::new();

        for code in 0u64..(1u64 << n) {
            let values: Vec<bool> = (0..n).map(|j| (code >> (n - 1 - j)) & 1 == 1).collect();
            let interp = Interpretation::new(values);
            if satisfies(&interp) {
                models.push(interp);
            }
        }

        Self {
            propositions,
            models,
        }
    }

    /// The proposition signature, in order.
    pub fn propositions(&self) -> &[String] {
        &self.propositions
    }

    /// The satisfying interpretations, in enumeration order.
    pub fn models(&self) -> &[Interpretation] {
        &self.models
    }

    /// Signature width shared by every model.
    pub fn width(&self) -> usize {
        self.propositions.len()
    }
}
