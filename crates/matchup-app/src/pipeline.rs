// End-to-end run: load stats, sweep every matchup, write the table.

use crate::config::{Config, SimulationSettings, MAX_SEED};
use crate::output;
use crate::stats;
use anyhow::Context;
use chrono::Utc;
use matchup_core::{MatchupResult, TeamProfile};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub teams: usize,
    pub matchups: usize,
    pub seed: u64,
    pub elapsed_ms: i64,
    pub output: PathBuf,
}

/// Draw a run seed that can be written back into `simulation.toml`.
pub fn draw_seed() -> u64 {
    rand::thread_rng().gen_range(0..=MAX_SEED)
}

/// Sweep all matchups with the configured execution mode. The sequential
/// path draws from a single ChaCha stream seeded with `seed`; the parallel
/// path derives one stream per matchup.
pub fn simulate(
    profiles: &[TeamProfile],
    settings: &SimulationSettings,
    seed: u64,
) -> anyhow::Result<Vec<MatchupResult>> {
    if !settings.parallel {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        return matchup_core::sweep(profiles, settings.num_trials, &settings.model, &mut rng)
            .context("matchup sweep failed");
    }

    let run = || {
        matchup_core::sweep_parallel(profiles, settings.num_trials, &settings.model, seed, None)
    };
    let results = if settings.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(settings.threads)
            .build()
            .context("failed to build worker pool")?
            .install(run)
    } else {
        run()
    };
    results.context("matchup sweep failed")
}

/// Run the full pipeline described by `config`.
pub fn run(config: &Config) -> anyhow::Result<RunSummary> {
    let started = Utc::now();

    let profiles = stats::load_team_profiles(&config.data_paths)
        .context("failed to load team statistics")?;
    info!("Loaded {} team profiles", profiles.len());

    let seed = config.simulation.seed.unwrap_or_else(draw_seed);
    info!(
        "Simulating with seed {} ({} mode)",
        seed,
        if config.simulation.parallel { "parallel" } else { "sequential" }
    );

    let results = simulate(&profiles, &config.simulation, seed)?;

    let output_path = Path::new(&config.data_paths.output);
    output::write_results(output_path, &results)
        .with_context(|| format!("failed to write results to {}", output_path.display()))?;

    let elapsed_ms = (Utc::now() - started).num_milliseconds();
    info!(
        "Wrote {} matchups to {} in {} ms",
        results.len(),
        output_path.display(),
        elapsed_ms
    );

    Ok(RunSummary {
        teams: profiles.len(),
        matchups: results.len(),
        seed,
        elapsed_ms,
        output: output_path.to_path_buf(),
    })
}
