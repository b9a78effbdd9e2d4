// Repeated-trial aggregation: many simulated games reduced to a win percentage.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::config::{validate_num_trials, SimulationConfig};
use crate::error::SimError;
use crate::game::simulate_game;
use crate::profile::TeamProfile;
use crate::results::MatchupResult;

/// Trials per matchup when the caller has no preference.
pub const DEFAULT_NUM_TRIALS: u64 = 10_000;

/// Trials per parallel chunk. Fixed so that chunk seeding, and therefore the
/// result, does not depend on the thread count.
const TRIAL_CHUNK_SIZE: u64 = 1_024;

/// Count how many of `num_trials` games `team_a` wins. Inputs are assumed
/// validated.
pub(crate) fn count_wins<R: Rng + ?Sized>(
    team_a: &TeamProfile,
    team_b: &TeamProfile,
    num_trials: u64,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<u64, SimError> {
    let mut wins = 0u64;
    for _ in 0..num_trials {
        if simulate_game(team_a, team_b, config, rng)? {
            wins += 1;
        }
    }
    Ok(wins)
}

fn validate_inputs(
    team_a: &TeamProfile,
    team_b: &TeamProfile,
    num_trials: u64,
    config: &SimulationConfig,
) -> Result<(), SimError> {
    validate_num_trials(num_trials)?;
    config.validate()?;
    team_a.validate(config.strict_validation)?;
    team_b.validate(config.strict_validation)
}

/// Simulate `num_trials` games between `team_a` and `team_b` using the
/// caller's generator and report each side's win percentage.
pub fn run_trials<R: Rng + ?Sized>(
    team_a: &TeamProfile,
    team_b: &TeamProfile,
    num_trials: u64,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<MatchupResult, SimError> {
    validate_inputs(team_a, team_b, num_trials, config)?;
    let wins = count_wins(team_a, team_b, num_trials, config, rng)?;
    Ok(MatchupResult::from_wins(
        &team_a.school,
        &team_b.school,
        wins,
        num_trials,
    ))
}

/// Parallel version of [`run_trials`]. The trial range is split into fixed
/// chunks, each with its own ChaCha stream derived from `seed`, and the
/// per-chunk win counts are summed.
pub fn run_trials_parallel(
    team_a: &TeamProfile,
    team_b: &TeamProfile,
    num_trials: u64,
    config: &SimulationConfig,
    seed: u64,
) -> Result<MatchupResult, SimError> {
    validate_inputs(team_a, team_b, num_trials, config)?;

    let num_chunks = num_trials.div_ceil(TRIAL_CHUNK_SIZE);
    let wins = (0..num_chunks)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * TRIAL_CHUNK_SIZE;
            let len = TRIAL_CHUNK_SIZE.min(num_trials - start);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(chunk);
            count_wins(team_a, team_b, len, config, &mut rng)
        })
        .try_reduce(|| 0, |a, b| Ok(a + b))?;

    Ok(MatchupResult::from_wins(
        &team_a.school,
        &team_b.school,
        wins,
        num_trials,
    ))
}
