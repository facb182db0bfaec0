//! JSON export of round-by-round belief snapshots.

use doxa_core::InfluenceGraph;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// One agent's belief set at a snapshot point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentBeliefs {
    pub name: String,
    /// Models rendered in `(1, 0, 0)` notation.
    pub models: Vec<String>,
}

/// The whole population's beliefs after one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundFrame {
    /// Round number; 0 is the pre-run state.
    pub round: u64,
    pub beliefs: Vec<AgentBeliefs>,
}

impl RoundFrame {
    /// Captures the graph's current belief states.
    pub fn capture(round: u64, graph: &InfluenceGraph) -> Self {
        let beliefs = graph
            .agents()
            .iter()
            .map(|agent| AgentBeliefs {
                name: agent.name().to_string(),
                models: agent.models().iter().map(ToString::to_string).collect(),
            })
            .collect();

        Self { round, beliefs }
    }
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Rounds actually executed
    pub rounds: u64,

    /// Snapshot per round, frame 0 included
    pub frames: Vec<RoundFrame>,

    /// Final verdict
    pub passed: bool,

    /// Round at which the population stopped changing, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converged_round: Option<u64>,
}

impl RunExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            rounds: 0,
            frames: Vec::new(),
            passed: false,
            converged_round: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: RoundFrame) {
        self.rounds = frame.round;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, converged_round: Option<u64>) {
        self.passed = passed;
        self.converged_round = converged_round;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios;

    #[test]
    fn test_capture_reads_all_agents() {
        let graph = scenarios::triangle().unwrap();
        let frame = RoundFrame::capture(0, &graph);

        assert_eq!(frame.beliefs.len(), 3);
        assert_eq!(frame.beliefs[0].name, "A");
        assert_eq!(frame.beliefs[0].models, vec!["(1, 0, 0)".to_string()]);
    }

    #[test]
    fn test_export_round_trips_through_json() {
        let graph = scenarios::triangle().unwrap();
        let mut export = RunExport::new("triangle", 42);
        export.add_frame(RoundFrame::capture(0, &graph));
        export.finalize(true, Some(3));

        let json = serde_json::to_string(&export).unwrap();
        let back: RunExport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scenario, "triangle");
        assert_eq!(back.frames.len(), 1);
        assert_eq!(back.converged_round, Some(3));
        assert!(back.passed);
    }
}
