//! Boundary rule types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::RuleThresholds;
use crate::models::{Event, EventId, PlayerRole, PlayerRoster, TeamId};

/// The ten ways an episode can end, in evaluation order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryRule {
    ChangedPossession,
    AttackReset,
    GoalkeeperSave,
    GoalScored,
    Foul,
    Offside,
    BallOutOfPlay,
    EndOfPeriod,
    EffectiveClearance,
    NewSetPiece,
}

impl BoundaryRule {
    /// Fixed evaluation order. Do not sort by event time.
    pub const ALL: [BoundaryRule; 10] = [
        BoundaryRule::ChangedPossession,
        BoundaryRule::AttackReset,
        BoundaryRule::GoalkeeperSave,
        BoundaryRule::GoalScored,
        BoundaryRule::Foul,
        BoundaryRule::Offside,
        BoundaryRule::BallOutOfPlay,
        BoundaryRule::EndOfPeriod,
        BoundaryRule::EffectiveClearance,
        BoundaryRule::NewSetPiece,
    ];

    /// 1-based position in the evaluation order
    pub fn priority(&self) -> usize {
        *self as usize + 1
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoundaryRule::ChangedPossession => "changed_possession",
            BoundaryRule::AttackReset => "attack_reset",
            BoundaryRule::GoalkeeperSave => "goalkeeper_save",
            BoundaryRule::GoalScored => "goal_scored",
            BoundaryRule::Foul => "foul",
            BoundaryRule::Offside => "offside",
            BoundaryRule::BallOutOfPlay => "ball_out_of_play",
            BoundaryRule::EndOfPeriod => "end_of_period",
            BoundaryRule::EffectiveClearance => "effective_clearance",
            BoundaryRule::NewSetPiece => "new_set_piece",
        }
    }
}

impl fmt::Display for BoundaryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a predicate may look at.
///
/// `window` is the trimmed candidate window (row 0 is the restart).
/// `lookahead` is the untrimmed run of rows starting at the same restart,
/// the only place a period or match change can be seen.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub window: &'a [&'a Event],
    pub lookahead: Option<&'a [&'a Event]>,
    pub roster: &'a PlayerRoster,
    pub thresholds: &'a RuleThresholds,
}

impl<'a> RuleContext<'a> {
    pub fn restart(&self) -> Option<&'a Event> {
        self.window.first().copied()
    }

    /// Team that took the restart.
    pub fn attacking_team(&self) -> Option<TeamId> {
        self.restart().map(|e| e.team_id)
    }

    pub fn role_of(&self, event: &Event) -> Option<PlayerRole> {
        self.roster.role_of(event.player_id)
    }
}

/// One termination predicate.
pub trait BoundaryCheck: Send + Sync {
    fn rule(&self) -> BoundaryRule;

    /// Id of the boundary event, if this rule ends the episode.
    fn check(&self, ctx: &RuleContext<'_>) -> Option<EventId>;
}

/// Winning rule and where the episode ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoundaryMatch {
    pub rule: BoundaryRule,
    pub boundary_id: EventId,
    /// Row of the boundary inside the window
    pub boundary_index: usize,
}

/// What one rule says about a window, fired or not.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleVerdict {
    pub rule: BoundaryRule,
    pub boundary_id: Option<EventId>,
}

/// Firing counts, shared across worker threads.
#[derive(Debug, Default)]
pub struct RuleEvaluationStats {
    /// Windows handed to the engine
    pub windows_evaluated: AtomicU64,
    /// Windows where no rule fired
    pub unresolved: AtomicU64,
    fired: [AtomicU64; 10],
}

impl RuleEvaluationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, rule: Option<BoundaryRule>) {
        self.windows_evaluated.fetch_add(1, Ordering::Relaxed);
        match rule {
            Some(rule) => {
                self.fired[rule as usize].fetch_add(1, Ordering::Relaxed);
            }
            None => {
                self.unresolved.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn fired(&self, rule: BoundaryRule) -> u64 {
        self.fired[rule as usize].load(Ordering::Relaxed)
    }

    pub fn total_windows(&self) -> u64 {
        self.windows_evaluated.load(Ordering::Relaxed)
    }

    pub fn total_unresolved(&self) -> u64 {
        self.unresolved.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.windows_evaluated.store(0, Ordering::Relaxed);
        self.unresolved.store(0, Ordering::Relaxed);
        for counter in &self.fired {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn log_summary(&self) {
        let total = self.total_windows();
        if total == 0 {
            return;
        }
        tracing::info!(
            windows = total,
            unresolved = self.total_unresolved(),
            "boundary rule stats"
        );
        for rule in BoundaryRule::ALL {
            let fired = self.fired(rule);
            if fired > 0 {
                tracing::info!(
                    rule = %rule,
                    fired,
                    share = format!("{:.1}%", fired as f64 * 100.0 / total as f64),
                    "  rule firings"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_follows_order() {
        for (i, rule) in BoundaryRule::ALL.iter().enumerate() {
            assert_eq!(rule.priority(), i + 1);
        }
        assert_eq!(BoundaryRule::GoalScored.priority(), 4);
        assert_eq!(BoundaryRule::NewSetPiece.priority(), 10);
    }

    #[test]
    fn test_rule_names_on_the_wire() {
        let json = serde_json::to_string(&BoundaryRule::BallOutOfPlay).unwrap();
        assert_eq!(json, "\"ball_out_of_play\"");
        assert_eq!(BoundaryRule::EndOfPeriod.to_string(), "end_of_period");
    }

    #[test]
    fn test_stats_counting() {
        let stats = RuleEvaluationStats::new();
        stats.record(Some(BoundaryRule::Foul));
        stats.record(Some(BoundaryRule::Foul));
        stats.record(None);
        assert_eq!(stats.total_windows(), 3);
        assert_eq!(stats.fired(BoundaryRule::Foul), 2);
        assert_eq!(stats.fired(BoundaryRule::Offside), 0);
        assert_eq!(stats.total_unresolved(), 1);

        stats.reset();
        assert_eq!(stats.total_windows(), 0);
        assert_eq!(stats.fired(BoundaryRule::Foul), 0);
    }
}
