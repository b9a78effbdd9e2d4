// Single-game scoring model.
//
// Each team's score is the sum of `possessions` normal draws whose mean is the
// team's full rating differential against the opponent. The per-draw mean is
// not divided by the possession count, so absolute scores scale with
// `possessions * differential`; only the comparison between the two sums is
// meaningful.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::profile::TeamProfile;

/// Shared possession count: the floor of the two teams' average pace.
///
/// An average that does not fit in a `u32` is rejected rather than clamped.
pub fn possessions(team_a: &TeamProfile, team_b: &TeamProfile) -> Result<u32, SimError> {
    let average = ((team_a.pace + team_b.pace) / 2.0).floor();
    if !average.is_finite() || average <= 0.0 {
        // Blame the slower side; it is the one pulling the average down.
        let culprit = if team_a.pace <= team_b.pace { team_a } else { team_b };
        return Err(SimError::profile(
            &culprit.school,
            format!(
                "average pace of {} vs {} yields {} possessions",
                team_a.school, team_b.school, average
            ),
        ));
    }
    if average > f64::from(u32::MAX) {
        let culprit = if team_a.pace >= team_b.pace { team_a } else { team_b };
        return Err(SimError::profile(
            &culprit.school,
            format!(
                "average pace of {} vs {} yields {} possessions, more than {}",
                team_a.school,
                team_b.school,
                average,
                u32::MAX
            ),
        ));
    }
    Ok(average as u32)
}

fn sample_score<R: Rng + ?Sized>(dist: &Normal<f64>, possessions: u32, rng: &mut R) -> f64 {
    let mut score = 0.0;
    for _ in 0..possessions {
        score += dist.sample(rng);
    }
    score
}

/// Simulate one game. Returns `true` if `team_a` scored strictly more than
/// `team_b`; an exact tie counts as a loss for `team_a`.
///
/// Draws all of `team_a`'s samples before any of `team_b`'s, so a seeded
/// generator reproduces the same outcome.
pub fn simulate_game<R: Rng + ?Sized>(
    team_a: &TeamProfile,
    team_b: &TeamProfile,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<bool, SimError> {
    let possessions = possessions(team_a, team_b)?;
    let std_dev = config.effective_standard_deviation();
    let field = config.effective_standard_deviation_field();

    let mean_a = team_a.expected_margin_against(team_b);
    let mean_b = team_b.expected_margin_against(team_a);

    let dist_a = normal(mean_a, std_dev, field)?;
    let dist_b = normal(mean_b, std_dev, field)?;

    let score_a = sample_score(&dist_a, possessions, rng);
    let score_b = sample_score(&dist_b, possessions, rng);

    Ok(score_a > score_b)
}

pub(crate) fn normal(mean: f64, std_dev: f64, field: &str) -> Result<Normal<f64>, SimError> {
    Normal::new(mean, std_dev).map_err(|e| {
        SimError::config(
            field,
            format!("cannot sample N({mean}, {std_dev}): {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn team(name: &str, pace: f64, ortg: f64, drtg: f64) -> TeamProfile {
        TeamProfile::new(name, pace, ortg, drtg, 0.0, 0.0, 0.0)
    }

    #[test]
    fn possessions_floor_average_pace() {
        let a = team("A", 70.0, 100.0, 100.0);
        let b = team("B", 71.0, 100.0, 100.0);
        assert_eq!(possessions(&a, &b).unwrap(), 70);
    }

    #[test]
    fn zero_possessions_is_profile_error() {
        let a = team("Fast", 1.0, 100.0, 100.0);
        let b = team("Stalled", 0.0, 100.0, 100.0);
        match possessions(&a, &b).unwrap_err() {
            SimError::InvalidTeamProfile { team, .. } => assert_eq!(team, "Stalled"),
            other => panic!("expected InvalidTeamProfile, got: {other}"),
        }
    }

    #[test]
    fn pace_beyond_u32_range_is_rejected() {
        let a = team("Runaway", 1.0e10, 100.0, 100.0);
        let b = team("Normal", 68.0, 100.0, 100.0);
        match possessions(&a, &b).unwrap_err() {
            SimError::InvalidTeamProfile { team, .. } => assert_eq!(team, "Runaway"),
            other => panic!("expected InvalidTeamProfile, got: {other}"),
        }

        let at_limit = team("Limit", f64::from(u32::MAX), 100.0, 100.0);
        assert_eq!(possessions(&at_limit, &at_limit).unwrap(), u32::MAX);
    }

    #[test]
    fn bad_spread_error_names_the_field_in_use() {
        let a = team("A", 68.0, 100.0, 100.0);
        let b = team("B", 68.0, 100.0, 100.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let tournament = SimulationConfig {
            tournament_mode: true,
            tournament_standard_deviation: f64::INFINITY,
            ..SimulationConfig::default()
        };
        match simulate_game(&a, &b, &tournament, &mut rng).unwrap_err() {
            SimError::InvalidConfiguration { field, .. } => {
                assert_eq!(field, "tournament_standard_deviation")
            }
            other => panic!("expected InvalidConfiguration, got: {other}"),
        }

        let regular = SimulationConfig::with_standard_deviation(f64::NAN);
        match simulate_game(&a, &b, &regular, &mut rng).unwrap_err() {
            SimError::InvalidConfiguration { field, .. } => assert_eq!(field, "standard_deviation"),
            other => panic!("expected InvalidConfiguration, got: {other}"),
        }
    }

    #[test]
    fn simulate_game_propagates_zero_pace() {
        let a = team("A", 0.0, 100.0, 100.0);
        let b = team("B", 0.0, 100.0, 100.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = simulate_game(&a, &b, &SimulationConfig::default(), &mut rng);
        assert!(matches!(result, Err(SimError::InvalidTeamProfile { .. })));
    }

    #[test]
    fn same_seed_same_outcome_sequence() {
        let a = team("A", 68.0, 104.0, 101.0);
        let b = team("B", 68.0, 103.0, 100.0);
        let config = SimulationConfig::default();

        let mut rng1 = ChaCha8Rng::seed_from_u64(99);
        let mut rng2 = ChaCha8Rng::seed_from_u64(99);
        let run1: Vec<bool> = (0..50)
            .map(|_| simulate_game(&a, &b, &config, &mut rng1).unwrap())
            .collect();
        let run2: Vec<bool> = (0..50)
            .map(|_| simulate_game(&a, &b, &config, &mut rng2).unwrap())
            .collect();
        assert_eq!(run1, run2);
    }

    #[test]
    fn tiny_spread_makes_favorite_always_win() {
        // Per-possession means of +10 vs 0 with almost no noise.
        let a = team("A", 70.0, 110.0, 100.0);
        let b = team("B", 70.0, 100.0, 100.0);
        let config = SimulationConfig::with_standard_deviation(1e-6);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(simulate_game(&a, &b, &config, &mut rng).unwrap());
            assert!(!simulate_game(&b, &a, &config, &mut rng).unwrap());
        }
    }

    #[test]
    fn invalid_spread_surfaces_as_configuration_error() {
        let a = team("A", 70.0, 100.0, 100.0);
        let b = team("B", 70.0, 100.0, 100.0);
        let config = SimulationConfig::with_standard_deviation(f64::NAN);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = simulate_game(&a, &b, &config, &mut rng);
        assert!(matches!(result, Err(SimError::InvalidConfiguration { .. })));
    }
}
