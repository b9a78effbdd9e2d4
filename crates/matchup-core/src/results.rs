// Matchup result records and the ordered collector handed to writers.

use serde::{Deserialize, Serialize};

/// Win percentages for one matchup. `team1`/`team2` keep input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupResult {
    #[serde(rename = "Team1")]
    pub team1: String,
    #[serde(rename = "Team2")]
    pub team2: String,
    #[serde(rename = "Team1_Win_Percentage")]
    pub team1_win_pct: f64,
    #[serde(rename = "Team2_Win_Percentage")]
    pub team2_win_pct: f64,
}

impl MatchupResult {
    /// Build a result from a win count. The second percentage is the
    /// complement of the first, so the pair always sums to 100.
    pub(crate) fn from_wins(team1: &str, team2: &str, team1_wins: u64, num_trials: u64) -> Self {
        let team1_win_pct = team1_wins as f64 / num_trials as f64 * 100.0;
        MatchupResult {
            team1: team1.to_string(),
            team2: team2.to_string(),
            team1_win_pct,
            team2_win_pct: 100.0 - team1_win_pct,
        }
    }

    /// Name of the team more likely to win. Ties go to `team1`.
    pub fn favorite(&self) -> &str {
        if self.team2_win_pct > self.team1_win_pct {
            &self.team2
        } else {
            &self.team1
        }
    }

    pub fn underdog(&self) -> &str {
        if self.team2_win_pct > self.team1_win_pct {
            &self.team1
        } else {
            &self.team2
        }
    }

    /// The favorite's win percentage.
    pub fn favorite_win_pct(&self) -> f64 {
        self.team1_win_pct.max(self.team2_win_pct)
    }
}

/// Accumulates results in sweep order. No filtering or reordering happens
/// here beyond placing index-tagged results back into enumeration order.
#[derive(Debug, Default)]
pub struct ResultCollector {
    results: Vec<MatchupResult>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ResultCollector {
            results: Vec::with_capacity(capacity),
        }
    }

    /// Rebuild enumeration order from results tagged with their pair index,
    /// as produced by parallel workers.
    pub fn from_indexed(mut tagged: Vec<(usize, MatchupResult)>) -> Self {
        tagged.sort_by_key(|(index, _)| *index);
        ResultCollector {
            results: tagged.into_iter().map(|(_, result)| result).collect(),
        }
    }

    pub fn push(&mut self, result: MatchupResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[MatchupResult] {
        &self.results
    }

    /// Hand the ordered sequence to a writer.
    pub fn into_results(self) -> Vec<MatchupResult> {
        self.results
    }
}
