//! The influence graph - a directed trust topology over agents, plus the
//! synchronous belief-revision round it drives.
//!
//! One round follows a strict three-phase protocol:
//! 1. **Scoring**: every agent, against the frozen pre-round snapshot,
//!    scores each universe model by total Hamming distance to every model
//!    its connections currently hold, collecting the minimum-score tie set.
//! 2. **Resolution**: one tie-set member is drawn per agent, uniformly,
//!    from an injected random source.
//! 3. **Commit**: all selections are applied at once; no agent observes a
//!    half-committed round.
//!
//! Phase-1 scoring is a pure `&self` computation and independent per agent,
//! so callers may fan it out across threads; the commit barrier is the only
//! synchronization point.

use crate::agent::{Agent, AgentError};
use crate::interpretation::{Interpretation, InterpretationError};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

pub use crate::interpretation::hamming_distance;

/// Handle to an agent inside one [`InfluenceGraph`].
///
/// Ids are dense indices in roster (insertion) order and are only
/// meaningful for the graph that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentId(usize);

impl AgentId {
    /// Position of this agent in the graph's roster.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Errors raised by graph construction and revision rounds.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error(transparent)]
    Interpretation(#[from] InterpretationError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    /// `remove_connection` found no matching entry; never a silent no-op.
    #[error("agent {agent} has no connection to {connection}")]
    ConnectionNotFound { agent: String, connection: String },

    /// An [`AgentId`] that does not name a roster member.
    #[error("agent id {0} is not a graph node")]
    UnknownAgent(usize),

    /// Construction input the engine cannot operate on.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
}

/// A directed trust graph over a fixed model universe.
///
/// Self-loops and duplicate connections are permitted and never
/// deduplicated: a duplicated connection weighs twice in scoring, and a
/// self-loop makes an agent evidence for itself. The universe and roster
/// are frozen at construction; only connection lists and agent belief
/// states change afterwards.
#[derive(Debug, Clone)]
pub struct InfluenceGraph {
    universe: Vec<Interpretation>,
    agents: Vec<Agent>,
    edges: Vec<Vec<AgentId>>,
}

impl InfluenceGraph {
    /// Creates a graph over the belief base's model universe.
    pub fn new(base: &crate::belief_base::BeliefBase, agents: Vec<Agent>) -> Result<Self, GraphError> {
        Self::from_models(base.models().to_vec(), agents)
    }

    /// Creates a graph directly from a model universe, bypassing the
    /// belief base (the alternate construction entry point).
    pub fn from_models(
        universe: Vec<Interpretation>,
        agents: Vec<Agent>,
    ) -> Result<Self, GraphError> {
        let width = universe
            .first()
            .map(Interpretation::len)
            .ok_or_else(|| GraphError::DegenerateInput("empty model universe".to_string()))?;

        for model in &universe {
            if model.len() != width {
                return Err(InterpretationError::LengthMismatch {
                    left: width,
                    right: model.len(),
                }
                .into());
            }
        }

        if agents.is_empty() {
            return Err(GraphError::DegenerateInput("empty agent roster".to_string()));
        }
        for agent in &agents {
            for model in agent.models() {
                if model.len() != width {
                    return Err(InterpretationError::LengthMismatch {
                        left: width,
                        right: model.len(),
                    }
                    .into());
                }
            }
        }

        let edges = vec![Vec::new(); agents.len()];
        Ok(Self {
            universe,
            agents,
            edges,
        })
    }

    /// The frozen model universe, in construction order.
    pub fn universe(&self) -> &[Interpretation] {
        &self.universe
    }

    /// The agent roster, in insertion order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Ids of every roster member, in roster order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> {
        (0..self.agents.len()).map(AgentId)
    }

    /// Looks up an agent id by name.
    pub fn id_of(&self, name: &str) -> Option<AgentId> {
        self.agents.iter().position(|a| a.name() == name).map(AgentId)
    }

    /// The agent behind an id.
    pub fn agent(&self, id: AgentId) -> Result<&Agent, GraphError> {
        self.agents.get(id.0).ok_or(GraphError::UnknownAgent(id.0))
    }

    /// The agent's outgoing connection list, in order.
    pub fn connections(&self, id: AgentId) -> Result<&[AgentId], GraphError> {
        self.edges
            .get(id.0)
            .map(Vec::as_slice)
            .ok_or(GraphError::UnknownAgent(id.0))
    }

    /// Replaces the agent's outgoing connection list wholesale.
    ///
    /// Every referenced id must name a roster member.
    pub fn add_connections(
        &mut self,
        agent: AgentId,
        connections: Vec<AgentId>,
    ) -> Result<(), GraphError> {
        if agent.0 >= self.agents.len() {
            return Err(GraphError::UnknownAgent(agent.0));
        }
        for conn in &connections {
            if conn.0 >= self.agents.len() {
                return Err(GraphError::UnknownAgent(conn.0));
            }
        }

        self.edges[agent.0] = connections;
        Ok(())
    }

    /// Removes exactly one matching entry from the agent's connection list.
    ///
    /// Fails with [`GraphError::ConnectionNotFound`] if no entry matches.
    pub fn remove_connection(
        &mut self,
        agent: AgentId,
        connection: AgentId,
    ) -> Result<(), GraphError> {
        if agent.0 >= self.agents.len() {
            return Err(GraphError::UnknownAgent(agent.0));
        }

        let edges = &mut self.edges[agent.0];
        match edges.iter().position(|c| *c == connection) {
            Some(pos) => {
                edges.remove(pos);
                Ok(())
            }
            None => Err(GraphError::ConnectionNotFound {
                agent: self.agents[agent.0].name().to_string(),
                connection: self
                    .agents
                    .get(connection.0)
                    .map(|a| a.name().to_string())
                    .unwrap_or_else(|| format!("#{}", connection.0)),
            }),
        }
    }

    /// Connects every agent to the full roster, itself included.
    pub fn complete_graph(&mut self) {
        let all: Vec<AgentId> = self.agent_ids().collect();
        for edges in &mut self.edges {
            *edges = all.clone();
        }
    }

    /// Evidence score of every universe candidate for one agent.
    ///
    /// The score of candidate `c` is the sum of Hamming distances from `c`
    /// to every model of every connection - a connection's entire
    /// multi-model belief state counts, and duplicated or self connections
    /// count once per occurrence. An agent with no connections scores 0 on
    /// every candidate.
    pub fn evidence_scores(&self, agent: AgentId) -> Result<Vec<u64>, GraphError> {
        let edges = self
            .edges
            .get(agent.0)
            .ok_or(GraphError::UnknownAgent(agent.0))?;

        let mut scores = vec![0u64; self.universe.len()];
        for (c, candidate) in self.universe.iter().enumerate() {
            for conn in edges {
                for model in self.agents[conn.0].models() {
                    scores[c] += candidate.hamming_distance(model)? as u64;
                }
            }
        }

        Ok(scores)
    }

    /// Universe indices tied for the minimum evidence score.
    ///
    /// For a connectionless agent every candidate scores 0, so the tie set
    /// is the entire universe.
    pub fn tie_set(&self, agent: AgentId) -> Result<Vec<usize>, GraphError> {
        let scores = self.evidence_scores(agent)?;
        // Nonempty by the constructor's universe check.
        let min = scores
            .iter()
            .copied()
            .min()
            .ok_or_else(|| GraphError::DegenerateInput("empty model universe".to_string()))?;

        Ok(scores
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == min)
            .map(|(i, _)| i)
            .collect())
    }

    /// Runs one synchronous revision round.
    ///
    /// Scores and resolves every agent against the frozen pre-round state,
    /// then commits all selections at once; afterwards every agent holds a
    /// singleton belief set. The random source is injected so callers can
    /// seed or replay tie resolution.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GraphError> {
        // Phases 1-2: pure reads of the pre-round snapshot.
        let mut selections = Vec::with_capacity(self.agents.len());
        for id in self.agent_ids() {
            let ties = self.tie_set(id)?;
            let choice = *ties
                .choose(rng)
                .ok_or_else(|| GraphError::DegenerateInput("empty tie set".to_string()))?;
            selections.push(self.universe[choice].clone());
        }

        // Phase 3: barrier - every selection exists before any commit.
        for (agent, model) in self.agents.iter_mut().zip(selections) {
            agent.update_beliefs(vec![model])?;
        }

        Ok(())
    }
}
