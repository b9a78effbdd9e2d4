// Per-team season statistics consumed by the game model.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// The canonical statistical record for one team.
///
/// Percentages are fractions in [0, 1]; converting from the source's
/// percentage scale is the ingester's job. Profiles are never mutated once a
/// sweep starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamProfile {
    #[serde(rename = "School")]
    pub school: String,
    /// Average possessions per game.
    #[serde(rename = "Pace")]
    pub pace: f64,
    /// Points scored per 100 possessions.
    #[serde(rename = "ORtg")]
    pub ortg: f64,
    /// Points allowed per 100 possessions.
    #[serde(rename = "DRtg")]
    pub drtg: f64,
    /// Strength-of-schedule adjustment, added to offensive rating.
    #[serde(rename = "SOS")]
    pub sos: f64,
    #[serde(rename = "ORB%")]
    pub orb_pct: f64,
    #[serde(rename = "TOV%")]
    pub tov_pct: f64,
}

impl TeamProfile {
    pub fn new(
        school: impl Into<String>,
        pace: f64,
        ortg: f64,
        drtg: f64,
        sos: f64,
        orb_pct: f64,
        tov_pct: f64,
    ) -> Self {
        TeamProfile {
            school: school.into(),
            pace,
            ortg,
            drtg,
            sos,
            orb_pct,
            tov_pct,
        }
    }

    /// Check the profile invariants. With `strict`, ORB% and TOV% must also
    /// lie in [0, 1].
    pub fn validate(&self, strict: bool) -> Result<(), SimError> {
        if !self.pace.is_finite() || self.pace <= 0.0 {
            return Err(SimError::profile(
                &self.school,
                format!("Pace must be > 0, got {}", self.pace),
            ));
        }

        let fields = [
            ("ORtg", self.ortg),
            ("DRtg", self.drtg),
            ("SOS", self.sos),
            ("ORB%", self.orb_pct),
            ("TOV%", self.tov_pct),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(SimError::profile(
                    &self.school,
                    format!("{name} must be finite, got {value}"),
                ));
            }
        }

        if strict {
            for (name, value) in [("ORB%", self.orb_pct), ("TOV%", self.tov_pct)] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(SimError::profile(
                        &self.school,
                        format!("{name} must be a fraction in [0, 1], got {value}"),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Offensive rating adjusted for rebounding edge against the opponent's
    /// turnover rate, plus strength of schedule:
    /// `ORtg * (1 + (ORB% - opp.TOV%)) + SOS`
    pub fn adjusted_offense(&self, opponent: &TeamProfile) -> f64 {
        self.ortg * (1.0 + (self.orb_pct - opponent.tov_pct)) + self.sos
    }

    /// Mean of each per-possession score sample against `opponent`: the
    /// adjusted offensive rating minus the opponent's defensive rating.
    pub fn expected_margin_against(&self, opponent: &TeamProfile) -> f64 {
        self.adjusted_offense(opponent) - opponent.drtg
    }
}

/// Validate every profile, stopping at the first offender.
pub fn validate_all(profiles: &[TeamProfile], strict: bool) -> Result<(), SimError> {
    profiles.iter().try_for_each(|p| p.validate(strict))
}
