// All-pairs sweep: every unordered pair of profiles, in input order.
//
// Pairs are enumerated as (i, j) with i < j, lexicographically by index. The
// whole sweep fails on the first invalid profile; callers never see a
// partial result set.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{validate_num_trials, SimulationConfig};
use crate::error::SimError;
use crate::profile::{validate_all, TeamProfile};
use crate::results::{MatchupResult, ResultCollector};
use crate::trials::count_wins;

/// Number of unordered pairs among `n` teams.
pub fn matchup_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Iterate `(i, j)` index pairs with `i < j` in lexicographic order.
pub fn matchup_pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
}

fn validate_sweep(
    profiles: &[TeamProfile],
    num_trials: u64,
    config: &SimulationConfig,
) -> Result<(), SimError> {
    validate_num_trials(num_trials)?;
    config.validate()?;
    validate_all(profiles, config.strict_validation)
}

fn simulate_pair<R: Rng + ?Sized>(
    team_a: &TeamProfile,
    team_b: &TeamProfile,
    num_trials: u64,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<MatchupResult, SimError> {
    let wins = count_wins(team_a, team_b, num_trials, config, rng)?;
    let result = MatchupResult::from_wins(&team_a.school, &team_b.school, wins, num_trials);
    debug!(
        "{} over {}: {:.2}% likely",
        result.favorite(),
        result.underdog(),
        result.favorite_win_pct()
    );
    Ok(result)
}

/// Run the trial aggregator over every unordered pair, drawing all
/// randomness from `rng` in enumeration order.
pub fn sweep<R: Rng + ?Sized>(
    profiles: &[TeamProfile],
    num_trials: u64,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<Vec<MatchupResult>, SimError> {
    let never = AtomicBool::new(false);
    sweep_cancellable(profiles, num_trials, config, rng, &never)
}

/// [`sweep`] with a cancellation flag checked between matchups. A cancelled
/// sweep returns [`SimError::Cancelled`] and discards finished matchups.
pub fn sweep_cancellable<R: Rng + ?Sized>(
    profiles: &[TeamProfile],
    num_trials: u64,
    config: &SimulationConfig,
    rng: &mut R,
    cancel: &AtomicBool,
) -> Result<Vec<MatchupResult>, SimError> {
    validate_sweep(profiles, num_trials, config)?;

    let total = matchup_count(profiles.len());
    info!(
        "Sweeping {} matchups across {} teams ({} trials each, stdev {})",
        total,
        profiles.len(),
        num_trials,
        config.effective_standard_deviation()
    );

    let mut collector = ResultCollector::with_capacity(total);
    for (i, j) in matchup_pairs(profiles.len()) {
        if cancel.load(Ordering::Relaxed) {
            return Err(SimError::Cancelled {
                completed: collector.len(),
                total,
            });
        }
        collector.push(simulate_pair(&profiles[i], &profiles[j], num_trials, config, rng)?);
    }

    info!("Sweep finished: {} matchups", collector.len());
    Ok(collector.into_results())
}

/// Run the sweep across the rayon pool. Each pair gets its own ChaCha stream
/// (stream id = pair index) seeded from `seed`, so output is identical for a
/// given seed whatever the thread count. Results come back in enumeration
/// order.
///
/// On cancellation the reported `completed` count is approximate: it is read
/// while other workers may still be finishing their matchups.
pub fn sweep_parallel(
    profiles: &[TeamProfile],
    num_trials: u64,
    config: &SimulationConfig,
    seed: u64,
    cancel: Option<&AtomicBool>,
) -> Result<Vec<MatchupResult>, SimError> {
    validate_sweep(profiles, num_trials, config)?;

    let total = matchup_count(profiles.len());
    info!(
        "Sweeping {} matchups across {} teams on {} threads ({} trials each, stdev {})",
        total,
        profiles.len(),
        rayon::current_num_threads(),
        num_trials,
        config.effective_standard_deviation()
    );

    let pairs: Vec<(usize, (usize, usize))> = matchup_pairs(profiles.len()).enumerate().collect();
    let completed = AtomicUsize::new(0);

    let tagged = pairs
        .into_par_iter()
        .map(|(index, (i, j))| {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(SimError::Cancelled {
                    completed: completed.load(Ordering::Relaxed),
                    total,
                });
            }
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(index as u64);
            let result = simulate_pair(&profiles[i], &profiles[j], num_trials, config, &mut rng)?;
            completed.fetch_add(1, Ordering::Relaxed);
            Ok((index, result))
        })
        .collect::<Result<Vec<_>, SimError>>()?;

    let collector = ResultCollector::from_indexed(tagged);
    info!("Sweep finished: {} matchups", collector.len());
    Ok(collector.into_results())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matchup_count_formula() {
        assert_eq!(matchup_count(0), 0);
        assert_eq!(matchup_count(1), 0);
        assert_eq!(matchup_count(2), 1);
        assert_eq!(matchup_count(5), 10);
        assert_eq!(matchup_count(362), 65_341);
    }

    #[test]
    fn pairs_are_lexicographic() {
        let pairs: Vec<_> = matchup_pairs(4).collect();
        assert_eq!(
            pairs,
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
    }

    #[test]
    fn pairs_empty_for_fewer_than_two() {
        assert_eq!(matchup_pairs(0).count(), 0);
        assert_eq!(matchup_pairs(1).count(), 0);
    }

    #[test]
    fn pair_count_matches_formula() {
        for n in 0..12 {
            assert_eq!(matchup_pairs(n).count(), matchup_count(n));
        }
    }
}
