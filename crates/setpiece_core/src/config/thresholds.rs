//! Boundary rule thresholds
//!
//! | Rule | Threshold |
//! |------|-----------|
//! | Changed possession | run > 3 events, run time >= 15 s, any point past x = 50 |
//! | Attack reset | zone x 0..55 full width, 3 backward passes |
//! | Effective clearance | 60 total with forward progress, or 40 forward |

use serde::{Deserialize, Serialize};

use crate::error::{EpisodeError, Result};
use crate::geometry::{pitch, Zone};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleThresholds {
    /// Opponent run length that must be exceeded
    pub possession_run_limit: usize,
    /// Seconds of opponent possession that end the episode
    pub possession_seconds: f64,
    /// Opponent action past this x ends the episode
    pub midline_x: f64,
    /// Attacking action inside this zone resets the attack
    pub reset_zone: Zone,
    /// Consecutive backward passes that reset the attack
    pub backward_pass_run: usize,
    /// Clearance length counted only when it also goes forward
    pub clearance_total_distance: f64,
    /// Forward distance that makes a clearance effective on its own
    pub clearance_forward_distance: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            possession_run_limit: 3,
            possession_seconds: 15.0,
            midline_x: pitch::MIDLINE_X,
            reset_zone: Zone::own_half_to_back_third(),
            backward_pass_run: 3,
            clearance_total_distance: 60.0,
            clearance_forward_distance: 40.0,
        }
    }
}

impl RuleThresholds {
    pub fn validate(&self) -> Result<()> {
        if self.backward_pass_run == 0 {
            return Err(EpisodeError::InvalidInput(
                "rules.backward_pass_run must be positive".to_string(),
            ));
        }
        let distances = [
            ("rules.possession_seconds", self.possession_seconds),
            ("rules.clearance_total_distance", self.clearance_total_distance),
            ("rules.clearance_forward_distance", self.clearance_forward_distance),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value <= 0.0 {
                return Err(EpisodeError::InvalidInput(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        RuleThresholds::default().validate().unwrap();
    }

    #[test]
    fn test_nan_rejected() {
        let thresholds = RuleThresholds {
            possession_seconds: f64::NAN,
            ..RuleThresholds::default()
        };
        assert!(thresholds.validate().is_err());
    }
}
