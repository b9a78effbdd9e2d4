// Matchup simulator entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr)
// 2. Load config (copying defaults on first run)
// 3. Load stats, sweep all matchups, write the result table
// 4. Report the run summary

use matchup_app::config;
use matchup_app::pipeline;

use anyhow::Context;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Matchup simulator starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} trials per matchup, stdev {} (tournament mode: {})",
        config.simulation.num_trials,
        config.simulation.model.effective_standard_deviation(),
        config.simulation.model.tournament_mode
    );

    // 3. Run the pipeline
    let summary = pipeline::run(&config)?;

    // 4. Report
    info!(
        "Done: {} teams, {} matchups, seed {}, {} ms -> {}",
        summary.teams,
        summary.matchups,
        summary.seed,
        summary.elapsed_ms,
        summary.output.display()
    );
    Ok(())
}

/// Initialize tracing to stderr so stdout stays free for piping.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("matchup_app=info,matchup_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
