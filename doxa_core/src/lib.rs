//! doxa_core - belief-revision dynamics over directed trust graphs.
//!
//! Two tightly coupled engines over a shared model universe:
//! 1. **Simulation** ([`InfluenceGraph`]): one synchronous round of
//!    Hamming-distance evidence scoring, tie collection, injected-RNG
//!    resolution, and atomic commit.
//! 2. **Analysis** ([`MarkovModel`]): the exact joint-state transition
//!    system implied by the same rule, with stationary/limiting behavior
//!    extracted through eigen-analysis.

pub mod agent;
pub mod belief_base;
pub mod graph;
pub mod interpretation;
pub mod markov;

// Re-export key types for convenience
pub use agent::{Agent, AgentError};
pub use belief_base::BeliefBase;
pub use graph::{AgentId, GraphError, InfluenceGraph};
pub use interpretation::{hamming_distance, Interpretation, InterpretationError};
pub use markov::{JointState, MarkovError, MarkovModel};
