// Error taxonomy for the simulation core.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A team's statistics violate a profile invariant. Fatal to the sweep.
    #[error("invalid team profile for `{team}`: {reason}")]
    InvalidTeamProfile { team: String, reason: String },

    /// A simulation parameter is out of range. Raised before any work starts.
    #[error("invalid configuration for `{field}`: {message}")]
    InvalidConfiguration { field: String, message: String },

    /// The cancellation flag was raised. `completed` is exact for sequential
    /// sweeps; for parallel sweeps it is a snapshot taken while other workers
    /// may still be finishing, so it varies between runs.
    #[error("sweep cancelled after {completed} of {total} matchups")]
    Cancelled { completed: usize, total: usize },
}

impl SimError {
    pub(crate) fn profile(team: &str, reason: impl Into<String>) -> Self {
        SimError::InvalidTeamProfile {
            team: team.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config(field: &str, message: impl Into<String>) -> Self {
        SimError::InvalidConfiguration {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
