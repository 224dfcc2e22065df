//! Island-model simulation: four islands evolve in parallel and exchange
//! migrants only after every island has finished the current generation.
//!
//! Run with: `RUST_LOG=debug cargo run --example genetic_islands`

use cyclic_barrier::{RoundRunner, RunnerError};

fn main() -> Result<(), RunnerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let runner = RoundRunner::default_scenario();
    log::info!(
        "simulating {} islands for {} generations",
        runner.tasks().len(),
        runner.rounds()
    );

    let report = runner.run_simulated()?;

    log::info!(
        "simulation finished after {} barrier releases, {} missed deadlines",
        report.releases(),
        report.deadline_misses().len()
    );
    Ok(())
}
