//! Named scenarios and their fixture builders.
//!
//! Every fixture is an explicit, callable builder invoked by the runner,
//! tests, or demos - nothing here is constructed at module load.

use doxa_core::{Agent, BeliefBase, GraphError, InfluenceGraph, Interpretation};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// The worked 3-agent example: A=(1,0,0), B=(1,1,1), C=(0,0,1) with
    /// edges A->{A,B,C}, B->{A,B}, C->{C}, cross-checked against the
    /// analytic Markov model
    Triangle,

    /// Complete graph with self-loops; runs until every agent holds the
    /// same model
    Consensus,

    /// A single connectionless agent sampling the universe uniformly
    Isolated,

    /// Directed ring (everyone listens to itself and its successor);
    /// structural smoke test, convergence not required
    Ring,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Triangle,
            ScenarioId::Consensus,
            ScenarioId::Isolated,
            ScenarioId::Ring,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Triangle => "triangle",
            ScenarioId::Consensus => "consensus",
            ScenarioId::Isolated => "isolated",
            ScenarioId::Ring => "ring",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Triangle => {
                "3-agent worked example with analytic stationary cross-check"
            }
            ScenarioId::Consensus => "complete graph converging to a shared model",
            ScenarioId::Isolated => "connectionless agent sampling its universe uniformly",
            ScenarioId::Ring => "directed ring, structural invariants only",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "triangle" => Ok(ScenarioId::Triangle),
            "consensus" => Ok(ScenarioId::Consensus),
            "isolated" => Ok(ScenarioId::Isolated),
            "ring" => Ok(ScenarioId::Ring),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

/// The shared fixture theory: propositions p, q, r with r iff (p implies q).
///
/// Its universe is the four models (0,0,1), (0,1,1), (1,0,0), (1,1,1).
pub fn fixture_theory() -> BeliefBase {
    let props = vec!["p".to_string(), "q".to_string(), "r".to_string()];
    BeliefBase::from_predicate(props, |m| {
        let (p, q, r) = (
            m.get(0).unwrap_or(false),
            m.get(1).unwrap_or(false),
            m.get(2).unwrap_or(false),
        );
        r == (!p || q)
    })
}

/// Builds the worked 3-agent triangle.
pub fn triangle() -> Result<InfluenceGraph, GraphError> {
    let base = fixture_theory();
    let agents = vec![
        Agent::from_model("A", Interpretation::from_bits(&[1, 0, 0])),
        Agent::from_model("B", Interpretation::from_bits(&[1, 1, 1])),
        Agent::from_model("C", Interpretation::from_bits(&[0, 0, 1])),
    ];
    let mut graph = InfluenceGraph::new(&base, agents)?;

    let ids: Vec<_> = graph.agent_ids().collect();
    graph.add_connections(ids[0], vec![ids[0], ids[1], ids[2]])?;
    graph.add_connections(ids[1], vec![ids[0], ids[1]])?;
    graph.add_connections(ids[2], vec![ids[2]])?;
    Ok(graph)
}

/// Builds a complete graph whose agents start on distinct universe models.
pub fn consensus() -> Result<InfluenceGraph, GraphError> {
    let base = fixture_theory();
    let agents = base
        .models()
        .iter()
        .enumerate()
        .map(|(i, model)| Agent::from_model(format!("N{i}"), model.clone()))
        .collect();

    let mut graph = InfluenceGraph::new(&base, agents)?;
    graph.complete_graph();
    Ok(graph)
}

/// Builds a single connectionless agent over the fixture universe.
pub fn isolated() -> Result<InfluenceGraph, GraphError> {
    let base = fixture_theory();
    let agents = vec![Agent::from_model(
        "loner",
        Interpretation::from_bits(&[0, 0, 1]),
    )];
    InfluenceGraph::new(&base, agents)
}

/// Builds a directed ring: every agent listens to itself and its successor.
pub fn ring(agent_count: usize) -> Result<InfluenceGraph, GraphError> {
    let base = fixture_theory();
    let models = base.models();
    let agents = (0..agent_count)
        .map(|i| Agent::from_model(format!("R{i}"), models[i % models.len()].clone()))
        .collect();

    let mut graph = InfluenceGraph::new(&base, agents)?;
    let ids: Vec<_> = graph.agent_ids().collect();
    for (i, &id) in ids.iter().enumerate() {
        let successor = ids[(i + 1) % ids.len()];
        graph.add_connections(id, vec![id, successor])?;
    }
    Ok(graph)
}
