// Monte Carlo matchup engine: team profiles, single-game scoring model,
// repeated-trial aggregation, and the all-pairs sweep.

pub mod config;
pub mod error;
pub mod game;
pub mod profile;
pub mod results;
pub mod sweep;
pub mod trials;

pub use config::SimulationConfig;
pub use error::SimError;
pub use game::simulate_game;
pub use profile::TeamProfile;
pub use results::{MatchupResult, ResultCollector};
pub use sweep::{matchup_count, matchup_pairs, sweep, sweep_cancellable, sweep_parallel};
pub use trials::{run_trials, run_trials_parallel, DEFAULT_NUM_TRIALS};
