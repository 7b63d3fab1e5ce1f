//! Boundary Rule Engine - ordered first-match evaluation
//!
//! ## Evaluation Order (Fixed, Do Not Change)
//! 1. Changed possession
//! 2. Attack reset
//! 3. Goalkeeper save
//! 4. Goal scored
//! 5. Foul
//! 6. Offside
//! 7. Ball out of play
//! 8. End of half/match
//! 9. Effective clearance
//! 10. New set piece
//!
//! The first rule in this list that fires wins, even when a later rule
//! points at an earlier event.

use super::checks::standard_checks;
use super::types::{BoundaryCheck, BoundaryMatch, RuleContext, RuleEvaluationStats, RuleVerdict};
use crate::config::RuleThresholds;
use crate::error::{EpisodeError, Result};
use crate::models::{Event, EventId, PlayerRoster};
use crate::repository::EventLog;
use crate::window::{extract_lookahead, extract_window};

pub struct BoundaryRuleEngine {
    checks: Vec<Box<dyn BoundaryCheck>>,
    thresholds: RuleThresholds,
    stats: RuleEvaluationStats,
}

impl Default for BoundaryRuleEngine {
    fn default() -> Self {
        Self::new(RuleThresholds::default())
    }
}

impl BoundaryRuleEngine {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self {
            checks: standard_checks(),
            thresholds,
            stats: RuleEvaluationStats::default(),
        }
    }

    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    /// Firing statistics since construction (or the last reset)
    pub fn stats(&self) -> &RuleEvaluationStats {
        &self.stats
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    fn context<'a>(
        &'a self,
        window: &'a [&'a Event],
        lookahead: Option<&'a [&'a Event]>,
        roster: &'a PlayerRoster,
    ) -> Result<RuleContext<'a>> {
        if window.is_empty() {
            return Err(EpisodeError::InvalidInput(
                "candidate window is empty".to_string(),
            ));
        }
        Ok(RuleContext {
            window,
            lookahead,
            roster,
            thresholds: &self.thresholds,
        })
    }

    /// Main evaluation entry point
    ///
    /// Runs the rules in fixed order and returns the first that fires.
    /// Fails with `BoundaryNotFound` (carrying the restart id) when none
    /// does.
    pub fn evaluate(
        &self,
        window: &[&Event],
        lookahead: Option<&[&Event]>,
        roster: &PlayerRoster,
    ) -> Result<BoundaryMatch> {
        let ctx = self.context(window, lookahead, roster)?;
        let restart_id = window[0].id;

        for check in &self.checks {
            let Some(boundary_id) = check.check(&ctx) else {
                continue;
            };
            let rule = check.rule();
            let boundary_index = window.iter().position(|e| e.id == boundary_id).ok_or_else(|| {
                EpisodeError::consistency(
                    Some(window[0].match_id),
                    Some(boundary_id),
                    format!("rule {} picked an event outside the window of restart {}", rule, restart_id),
                )
            })?;

            self.stats.record(Some(rule));
            tracing::debug!(
                restart_id,
                rule = %rule,
                boundary_id,
                boundary_index,
                "episode boundary"
            );
            return Ok(BoundaryMatch {
                rule,
                boundary_id,
                boundary_index,
            });
        }

        self.stats.record(None);
        Err(EpisodeError::BoundaryNotFound { restart_id })
    }

    /// Every rule's verdict on the window, in evaluation order.
    ///
    /// Diagnostic only; statistics are not touched.
    pub fn evaluate_all(
        &self,
        window: &[&Event],
        lookahead: Option<&[&Event]>,
        roster: &PlayerRoster,
    ) -> Result<Vec<RuleVerdict>> {
        let ctx = self.context(window, lookahead, roster)?;
        Ok(self
            .checks
            .iter()
            .map(|check| RuleVerdict {
                rule: check.rule(),
                boundary_id: check.check(&ctx),
            })
            .collect())
    }

    /// Ad hoc check of one restart: cut its window out of `log` and
    /// evaluate it.
    pub fn check_restart(
        &self,
        log: &EventLog,
        roster: &PlayerRoster,
        restart_id: EventId,
        horizon: usize,
        lookahead: usize,
    ) -> Result<BoundaryMatch> {
        let window = extract_window(log, restart_id, horizon, true)?;
        let wide = extract_lookahead(log, restart_id, horizon, lookahead)?;
        self.evaluate(&window, Some(&wide), roster)
    }
}
