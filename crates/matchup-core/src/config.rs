// Scoring-model parameters shared by every simulated game.

use serde::Deserialize;

use crate::error::SimError;

/// Default per-possession score spread.
pub const DEFAULT_STANDARD_DEVIATION: f64 = 8.0;

/// Parameters of the game model.
///
/// Two standard deviations are carried because historical runs disagreed on
/// whether tournament games use a different spread. `tournament_mode` picks
/// which one applies; both default to 8.0.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub standard_deviation: f64,
    pub tournament_mode: bool,
    pub tournament_standard_deviation: f64,
    /// Reject profiles whose ORB%/TOV% fall outside [0, 1].
    pub strict_validation: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            standard_deviation: DEFAULT_STANDARD_DEVIATION,
            tournament_mode: false,
            tournament_standard_deviation: DEFAULT_STANDARD_DEVIATION,
            strict_validation: true,
        }
    }
}

impl SimulationConfig {
    /// Non-tournament configuration with the given spread.
    pub fn with_standard_deviation(standard_deviation: f64) -> Self {
        SimulationConfig {
            standard_deviation,
            ..Default::default()
        }
    }

    /// The spread the game model actually samples with.
    pub fn effective_standard_deviation(&self) -> f64 {
        if self.tournament_mode {
            self.tournament_standard_deviation
        } else {
            self.standard_deviation
        }
    }

    /// Name of the field [`effective_standard_deviation`] reads.
    ///
    /// [`effective_standard_deviation`]: SimulationConfig::effective_standard_deviation
    pub fn effective_standard_deviation_field(&self) -> &'static str {
        if self.tournament_mode {
            "tournament_standard_deviation"
        } else {
            "standard_deviation"
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let fields = [
            ("standard_deviation", self.standard_deviation),
            (
                "tournament_standard_deviation",
                self.tournament_standard_deviation,
            ),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::config(
                    name,
                    format!("must be a finite value > 0, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Reject a zero trial count before any simulation work begins.
pub(crate) fn validate_num_trials(num_trials: u64) -> Result<(), SimError> {
    if num_trials == 0 {
        return Err(SimError::config("num_trials", "must be greater than 0"));
    }
    Ok(())
}
