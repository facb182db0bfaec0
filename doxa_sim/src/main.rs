//! doxa simulation CLI
//!
//! Run seeded belief-revision scenarios and their analytic cross-checks.

use clap::Parser;
use doxa_sim::scenarios::ScenarioId;
use doxa_sim::{RunExport, ScenarioResult, ScenarioRunner};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Run a scenario while exporting a belief snapshot per round.
fn run_with_export(
    seed: u64,
    rounds: u64,
    scenario: ScenarioId,
    export_path: &str,
) -> ScenarioResult {
    let runner = ScenarioRunner::new(seed).with_rounds(rounds);
    let (result, frames) = runner.run_with_frames(scenario);

    let mut export = RunExport::new(scenario.name(), seed);
    for frame in frames {
        export.add_frame(frame);
    }
    export.finalize(result.passed, result.converged_round);

    if let Err(e) = export.write_to_file(export_path) {
        error!("Failed to write export: {:?}", e);
    } else {
        info!("Exported {} frames to {}", export.frames.len(), export_path);
    }

    result
}

/// doxa deterministic scenario CLI
#[derive(Parser, Debug)]
#[command(name = "doxa-sim")]
#[command(about = "Run seeded belief-revision scenarios", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Round budget per scenario run
    #[arg(short, long, default_value = "500")]
    rounds: u64,

    /// Scenario to run (triangle, consensus, isolated, ring, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export round-by-round belief snapshots to a JSON file
    #[arg(long)]
    export: Option<String>,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!("Available scenarios: triangle, consensus, isolated, ring, all");
            std::process::exit(1);
        })]
    };

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };

    // Handle --export mode
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            eprintln!("Error: --export only supports a single scenario, not 'all'");
            std::process::exit(1);
        }

        let result = run_with_export(base_seed, args.rounds, scenarios[0], export_path);
        if result.passed {
            info!(
                "{} (seed={}) PASSED - exported to {}",
                scenarios[0].name(),
                base_seed,
                export_path
            );
        } else {
            error!(
                "{} FAILED: {}",
                scenarios[0].name(),
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
            std::process::exit(1);
        }
        return;
    }

    // Run simulations
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = ScenarioRunner::new(seed).with_rounds(args.rounds);

        for scenario in &scenarios {
            let result = runner.run(*scenario);

            if !args.json {
                if result.passed {
                    info!(
                        "{} (seed={}) PASSED in {} rounds",
                        scenario.name(),
                        seed,
                        result.rounds_run
                    );
                } else {
                    error!(
                        "{} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }
            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "rounds": r.rounds_run,
                    "converged_round": r.converged_round,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to render JSON summary: {:?}", e),
        }
    } else if failed_count == 0 {
        info!("All {} scenario runs passed", total);
    } else {
        error!("{}/{} scenario runs failed", failed_count, total);
        for result in &all_results {
            if !result.passed {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
