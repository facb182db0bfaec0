//! doxa_sim - deterministic harness for the doxa belief-revision engines.
//!
//! All randomness in a run derives from a single 64-bit master seed fed to
//! a ChaCha8 stream, so every scenario replays bit-for-bit. Scenarios are
//! explicit fixture builders; nothing is constructed at module load.

pub mod export;
pub mod runner;
pub mod scenarios;

pub use export::{AgentBeliefs, RoundFrame, RunExport};
pub use runner::{RunnerError, ScenarioResult, ScenarioRunner};
pub use scenarios::ScenarioId;
