//! The ten termination predicates.
//!
//! Each predicate is independent: it scans the whole window on its own and
//! reports the first event it considers the end of the episode. Choosing
//! between predicates is the engine's job.

use super::types::{BoundaryCheck, BoundaryRule, RuleContext};
use crate::geometry::Displacement;
use crate::models::{Event, EventId, EventType, PlayerRole, SubEventType, Tag};

/// The predicates in evaluation order.
pub fn standard_checks() -> Vec<Box<dyn BoundaryCheck>> {
    vec![
        Box::new(ChangedPossession),
        Box::new(AttackReset),
        Box::new(GoalkeeperSave),
        Box::new(GoalScored),
        Box::new(FoulCommitted),
        Box::new(OffsideCalled),
        Box::new(BallOutOfPlay),
        Box::new(EndOfPeriod),
        Box::new(EffectiveClearance),
        Box::new(NewSetPiece),
    ]
}

/// First row of the window matching `pred`, index 0 included.
fn first_matching(ctx: &RuleContext<'_>, pred: impl Fn(&Event) -> bool) -> Option<EventId> {
    ctx.window.iter().find(|e| pred(e)).map(|e| e.id)
}

/// Row before the first row after the restart matching `pred`.
fn preceding_first_matching(
    ctx: &RuleContext<'_>,
    pred: impl Fn(&Event) -> bool,
) -> Option<EventId> {
    (1..ctx.window.len())
        .find(|&i| pred(ctx.window[i]))
        .map(|i| ctx.window[i - 1].id)
}

/// The defending team holds the ball long enough, often enough, far enough
/// upfield, or breaks on a counter.
///
/// A run is a streak of consecutive defending-team rows; an attacking-team
/// row ends it. Run time counts from the row just before the run starts.
/// The episode ends at the run's first row.
pub struct ChangedPossession;

impl BoundaryCheck for ChangedPossession {
    fn rule(&self) -> BoundaryRule {
        BoundaryRule::ChangedPossession
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<EventId> {
        let attacking = ctx.attacking_team()?;
        let limits = ctx.thresholds;
        let mut run_start: Option<usize> = None;

        for (i, event) in ctx.window.iter().enumerate().skip(1) {
            if event.team_id == attacking {
                run_start = None;
                continue;
            }

            let first = *run_start.get_or_insert(i);
            let run_len = i - first + 1;
            let run_secs = event.event_sec - ctx.window[first - 1].event_sec;

            let tripped = run_len > limits.possession_run_limit
                || run_secs >= limits.possession_seconds
                || event.start().beyond_midline(limits.midline_x)
                || event.end().beyond_midline(limits.midline_x)
                || event.has_tag(Tag::CounterAttack);

            if tripped {
                return Some(ctx.window[first].id);
            }
        }
        None
    }
}

/// The attacking team gives up on the set piece and rebuilds from the back.
///
/// Fires on the first attacking-team row that is either played by a
/// defender or goalkeeper (shots excepted), or starts or ends inside the
/// reset zone. A streak of backward passes fires at the streak's first pass.
pub struct AttackReset;

impl BoundaryCheck for AttackReset {
    fn rule(&self) -> BoundaryRule {
        BoundaryRule::AttackReset
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<EventId> {
        let attacking = ctx.attacking_team()?;
        let limits = ctx.thresholds;
        let mut backward: Option<(usize, usize)> = None;

        for (i, event) in ctx.window.iter().enumerate().skip(1) {
            if event.team_id != attacking {
                backward = None;
                continue;
            }

            let back_line = ctx.role_of(event).is_some_and(|r| r.is_back_line());
            if back_line && event.event_type != EventType::Shot {
                return Some(event.id);
            }

            if limits.reset_zone.contains(&event.start()) || limits.reset_zone.contains(&event.end()) {
                return Some(event.id);
            }

            let moved = Displacement::between(event.start(), event.end());
            if event.event_type == EventType::Pass && moved.is_backward() {
                let (first, count) = match backward {
                    Some((first, count)) => (first, count + 1),
                    None => (i, 1),
                };
                if count >= limits.backward_pass_run {
                    return Some(ctx.window[first].id);
                }
                backward = Some((first, count));
            } else {
                backward = None;
            }
        }
        None
    }
}

/// A save attempt the keeper actually made.
///
/// Save attempts tagged as goals are skipped. A save counts when it is
/// tagged accurate, or when the next row is played by a goalkeeper.
pub struct GoalkeeperSave;

impl BoundaryCheck for GoalkeeperSave {
    fn rule(&self) -> BoundaryRule {
        BoundaryRule::GoalkeeperSave
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<EventId> {
        ctx.window.iter().enumerate().find_map(|(i, event)| {
            if event.event_type != EventType::SaveAttempt || event.has_tag(Tag::Goal) {
                return None;
            }
            let keeper_next = ctx
                .window
                .get(i + 1)
                .is_some_and(|next| ctx.role_of(next) == Some(PlayerRole::Goalkeeper));
            (event.has_tag(Tag::Accurate) || keeper_next).then_some(event.id)
        })
    }
}

pub struct GoalScored;

impl BoundaryCheck for GoalScored {
    fn rule(&self) -> BoundaryRule {
        BoundaryRule::GoalScored
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<EventId> {
        first_matching(ctx, |e| e.has_tag(Tag::Goal))
    }
}

pub struct FoulCommitted;

impl BoundaryCheck for FoulCommitted {
    fn rule(&self) -> BoundaryRule {
        BoundaryRule::Foul
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<EventId> {
        first_matching(ctx, |e| e.event_type == EventType::Foul)
    }
}

pub struct OffsideCalled;

impl BoundaryCheck for OffsideCalled {
    fn rule(&self) -> BoundaryRule {
        BoundaryRule::Offside
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<EventId> {
        first_matching(ctx, |e| e.event_type == EventType::Offside)
    }
}

pub struct BallOutOfPlay;

impl BoundaryCheck for BallOutOfPlay {
    fn rule(&self) -> BoundaryRule {
        BoundaryRule::BallOutOfPlay
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<EventId> {
        first_matching(ctx, |e| e.sub_event_type == SubEventType::BallOutOfField)
    }
}

/// The half or the match is over.
///
/// With a whistle in the window, only a whistle whose successor belongs to
/// another period or match counts. Without one, the untrimmed look-ahead
/// decides: the episode ends on the last row before the change.
pub struct EndOfPeriod;

impl EndOfPeriod {
    /// Row after `event`, taken from the look-ahead when it holds `event`.
    fn successor<'a>(ctx: &RuleContext<'a>, index: usize, event: &Event) -> Option<&'a Event> {
        if let Some(lookahead) = ctx.lookahead {
            if let Some(pos) = lookahead.iter().position(|e| e.id == event.id) {
                return lookahead.get(pos + 1).copied();
            }
        }
        ctx.window.get(index + 1).copied()
    }
}

impl BoundaryCheck for EndOfPeriod {
    fn rule(&self) -> BoundaryRule {
        BoundaryRule::EndOfPeriod
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<EventId> {
        let mut saw_whistle = false;
        for (i, event) in ctx.window.iter().enumerate() {
            if event.sub_event_type != SubEventType::Whistle {
                continue;
            }
            saw_whistle = true;
            let next = Self::successor(ctx, i, event);
            if next.is_some_and(|n| !n.same_segment(event)) {
                return Some(event.id);
            }
        }
        if saw_whistle {
            return None;
        }

        let restart = ctx.restart()?;
        let lookahead = ctx.lookahead?;
        let change = lookahead.iter().position(|e| !e.same_segment(restart))?;
        change.checked_sub(1).map(|last| lookahead[last].id)
    }
}

/// A long clearance by anyone; the episode ends just before it.
///
/// Effective when the ball travels at least the total threshold while also
/// going forward, or at least the forward threshold along x.
pub struct EffectiveClearance;

impl BoundaryCheck for EffectiveClearance {
    fn rule(&self) -> BoundaryRule {
        BoundaryRule::EffectiveClearance
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<EventId> {
        let limits = ctx.thresholds;
        preceding_first_matching(ctx, |e| {
            if e.sub_event_type != SubEventType::Clearance {
                return false;
            }
            let moved = Displacement::between(e.start(), e.end());
            (moved.total >= limits.clearance_total_distance && moved.forward > 0.0)
                || moved.forward >= limits.clearance_forward_distance
        })
    }
}

/// Another restart inside the window; the episode ends just before it.
pub struct NewSetPiece;

impl BoundaryCheck for NewSetPiece {
    fn rule(&self) -> BoundaryRule {
        BoundaryRule::NewSetPiece
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<EventId> {
        preceding_first_matching(ctx, |e| e.is_restart())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleThresholds;
    use crate::models::{MatchPeriod, PlayerRoster};
    use crate::test_fixtures::*;

    fn run(check: &dyn BoundaryCheck, events: &[Event]) -> Option<EventId> {
        run_with_lookahead(check, events, None)
    }

    fn run_with_lookahead(
        check: &dyn BoundaryCheck,
        events: &[Event],
        lookahead: Option<&[Event]>,
    ) -> Option<EventId> {
        let window = refs(events);
        let lookahead = lookahead.map(refs);
        let roster = roster();
        let thresholds = RuleThresholds::default();
        let ctx = RuleContext {
            window: &window,
            lookahead: lookahead.as_deref(),
            roster: &roster,
            thresholds: &thresholds,
        };
        check.check(&ctx)
    }

    #[test]
    fn test_standard_order() {
        let rules: Vec<_> = standard_checks().iter().map(|c| c.rule()).collect();
        assert_eq!(rules, BoundaryRule::ALL.to_vec());
    }

    // -------------------------------------------------------------------------
    // Changed possession
    // -------------------------------------------------------------------------

    #[test]
    fn test_possession_time_trips_on_single_row() {
        let events = vec![restart(1, HOME_TEAM, 0.0), duel_at(2, AWAY_TEAM, 20.0, 30.0)];
        assert_eq!(run(&ChangedPossession, &events), Some(2));
    }

    #[test]
    fn test_possession_run_length() {
        let events = vec![
            restart(1, HOME_TEAM, 0.0),
            pass(2, HOME_TEAM, 1.0),
            duel_at(3, AWAY_TEAM, 2.0, 30.0),
            duel_at(4, AWAY_TEAM, 3.0, 30.0),
            duel_at(5, AWAY_TEAM, 4.0, 30.0),
            duel_at(6, AWAY_TEAM, 5.0, 30.0),
        ];
        // Fourth defending row exceeds the limit of three; boundary is the first
        assert_eq!(run(&ChangedPossession, &events), Some(3));
        assert_eq!(run(&ChangedPossession, &events[..5]), None);
    }

    #[test]
    fn test_attacking_row_resets_run() {
        let events = vec![
            restart(1, HOME_TEAM, 0.0),
            duel_at(2, AWAY_TEAM, 2.0, 30.0),
            duel_at(3, AWAY_TEAM, 3.0, 30.0),
            pass(4, HOME_TEAM, 4.0),
            duel_at(5, AWAY_TEAM, 5.0, 30.0),
            duel_at(6, AWAY_TEAM, 6.0, 30.0),
        ];
        assert_eq!(run(&ChangedPossession, &events), None);
    }

    #[test]
    fn test_possession_past_midline_or_counter() {
        let events = vec![restart(1, HOME_TEAM, 0.0), duel_at(2, AWAY_TEAM, 1.0, 50.5)];
        assert_eq!(run(&ChangedPossession, &events), Some(2));

        let events = vec![restart(1, HOME_TEAM, 0.0), duel_at(2, AWAY_TEAM, 1.0, 50.0)];
        assert_eq!(run(&ChangedPossession, &events), None);

        let events = vec![
            restart(1, HOME_TEAM, 0.0),
            tagged(duel_at(2, AWAY_TEAM, 1.0, 20.0), &[Tag::CounterAttack]),
        ];
        assert_eq!(run(&ChangedPossession, &events), Some(2));
    }

    // -------------------------------------------------------------------------
    // Attack reset
    // -------------------------------------------------------------------------

    #[test]
    fn test_reset_by_back_line_player() {
        let events = vec![
            restart(1, HOME_TEAM, 0.0),
            pass(2, HOME_TEAM, 2.0),
            by_player(pass(3, HOME_TEAM, 4.0), HOME_DEF),
        ];
        assert_eq!(run(&AttackReset, &events), Some(3));
    }

    #[test]
    fn test_defender_shot_is_not_a_reset() {
        let events = vec![restart(1, HOME_TEAM, 0.0), by_player(shot(2, HOME_TEAM, 2.0), HOME_DEF)];
        assert_eq!(run(&AttackReset, &events), None);
    }

    #[test]
    fn test_untracked_player_has_no_role() {
        let events = vec![restart(1, HOME_TEAM, 0.0), by_player(pass(2, HOME_TEAM, 2.0), 0)];
        assert_eq!(run(&AttackReset, &events), None);

        let empty = PlayerRoster::new();
        assert_eq!(empty.role_of(HOME_DEF), None);
    }

    #[test]
    fn test_reset_in_zone() {
        let events = vec![
            restart(1, HOME_TEAM, 0.0),
            positioned(pass(2, HOME_TEAM, 2.0), (70.0, 40.0), (54.0, 30.0)),
        ];
        assert_eq!(run(&AttackReset, &events), Some(2));

        // On the zone edge is outside
        let events = vec![
            restart(1, HOME_TEAM, 0.0),
            positioned(pass(2, HOME_TEAM, 2.0), (70.0, 40.0), (55.0, 30.0)),
        ];
        assert_eq!(run(&AttackReset, &events), None);
    }

    #[test]
    fn test_three_backward_passes() {
        let back = |id, sec| positioned(pass(id, HOME_TEAM, sec), (80.0, 50.0), (70.0, 40.0));
        let events = vec![restart(1, HOME_TEAM, 0.0), back(2, 1.0), back(3, 2.0), back(4, 3.0)];
        assert_eq!(run(&AttackReset, &events), Some(2));

        // A forward pass breaks the streak
        let events = vec![
            restart(1, HOME_TEAM, 0.0),
            back(2, 1.0),
            back(3, 2.0),
            pass(4, HOME_TEAM, 3.0),
            back(5, 4.0),
        ];
        assert_eq!(run(&AttackReset, &events), None);
    }

    #[test]
    fn test_defending_rows_are_ignored_for_reset() {
        let events = vec![restart(1, HOME_TEAM, 0.0), by_player(duel_at(2, AWAY_TEAM, 1.0, 10.0), AWAY_DEF)];
        assert_eq!(run(&AttackReset, &events), None);
    }

    // -------------------------------------------------------------------------
    // Goalkeeper save
    // -------------------------------------------------------------------------

    fn save_attempt(id: EventId, sec: f64) -> Event {
        by_player(event(id, AWAY_TEAM, EventType::SaveAttempt, SubEventType::Other(91), sec), AWAY_GK)
    }

    #[test]
    fn test_save_tagged_accurate() {
        let events = vec![
            restart(1, HOME_TEAM, 0.0),
            shot(2, HOME_TEAM, 3.0),
            tagged(save_attempt(3, 3.5), &[Tag::Accurate]),
        ];
        assert_eq!(run(&GoalkeeperSave, &events), Some(3));
    }

    #[test]
    fn test_save_followed_by_keeper() {
        let events = vec![
            restart(1, HOME_TEAM, 0.0),
            shot(2, HOME_TEAM, 3.0),
            save_attempt(3, 3.5),
            by_player(pass(4, AWAY_TEAM, 6.0), AWAY_GK),
        ];
        assert_eq!(run(&GoalkeeperSave, &events), Some(3));

        // Untagged save with an outfield player next is not a save
        let mut events = events;
        events[3].player_id = AWAY_MID;
        assert_eq!(run(&GoalkeeperSave, &events), None);
    }

    #[test]
    fn test_conceded_save_attempt_is_skipped() {
        let events = vec![
            restart(1, HOME_TEAM, 0.0),
            tagged(save_attempt(2, 3.5), &[Tag::Goal, Tag::Accurate]),
        ];
        assert_eq!(run(&GoalkeeperSave, &events), None);
    }

    // -------------------------------------------------------------------------
    // Single-row rules
    // -------------------------------------------------------------------------

    #[test]
    fn test_first_match_rules() {
        let events = vec![
            restart(1, HOME_TEAM, 0.0),
            event(2, AWAY_TEAM, EventType::Foul, SubEventType::Other(20), 2.0),
            event(3, HOME_TEAM, EventType::Offside, SubEventType::Other(0), 3.0),
            event(4, HOME_TEAM, EventType::Interruption, SubEventType::BallOutOfField, 4.0),
            tagged(shot(5, HOME_TEAM, 5.0), &[Tag::Goal]),
            event(6, AWAY_TEAM, EventType::Foul, SubEventType::Other(20), 6.0),
        ];
        assert_eq!(run(&FoulCommitted, &events), Some(2));
        assert_eq!(run(&OffsideCalled, &events), Some(3));
        assert_eq!(run(&BallOutOfPlay, &events), Some(4));
        assert_eq!(run(&GoalScored, &events), Some(5));
    }

    #[test]
    fn test_goal_on_restart_itself() {
        let events = vec![tagged(restart(1, HOME_TEAM, 0.0), &[Tag::Goal]), pass(2, AWAY_TEAM, 1.0)];
        assert_eq!(run(&GoalScored, &events), Some(1));
    }

    // -------------------------------------------------------------------------
    // End of period
    // -------------------------------------------------------------------------

    fn whistle(id: EventId, sec: f64) -> Event {
        event(id, HOME_TEAM, EventType::Interruption, SubEventType::Whistle, sec)
    }

    #[test]
    fn test_whistle_before_half_time() {
        let log = vec![
            restart(1, HOME_TEAM, 2700.0),
            pass(2, HOME_TEAM, 2702.0),
            whistle(3, 2705.0),
            in_period(restart(4, AWAY_TEAM, 0.0), MatchPeriod::SecondHalf),
        ];
        let window = &log[..3];
        assert_eq!(run_with_lookahead(&EndOfPeriod, window, Some(&log)), Some(3));
        // The trimmed window alone cannot see the change
        assert_eq!(run(&EndOfPeriod, window), None);
    }

    #[test]
    fn test_mid_period_whistle_does_not_fire() {
        let log = vec![
            restart(1, HOME_TEAM, 100.0),
            whistle(2, 102.0),
            restart(3, AWAY_TEAM, 130.0),
            in_period(restart(4, AWAY_TEAM, 0.0), MatchPeriod::SecondHalf),
        ];
        let window = &log[..3];
        // The period change is visible, but the whistle is not right before it
        assert_eq!(run_with_lookahead(&EndOfPeriod, window, Some(&log)), None);
    }

    #[test]
    fn test_change_without_whistle_uses_lookahead() {
        let log = vec![
            restart(1, HOME_TEAM, 2790.0),
            pass(2, HOME_TEAM, 2792.0),
            in_match(restart(3, HOME_TEAM, 0.0), OTHER_MATCH),
        ];
        assert_eq!(run_with_lookahead(&EndOfPeriod, &log[..2], Some(&log)), Some(2));
        assert_eq!(run_with_lookahead(&EndOfPeriod, &log[..2], Some(&log[..2])), None);
    }

    // -------------------------------------------------------------------------
    // Clearance and new set piece
    // -------------------------------------------------------------------------

    fn clearance(id: EventId, sec: f64, start: (f64, f64), end: (f64, f64)) -> Event {
        let e = event(id, AWAY_TEAM, EventType::OthersOnTheBall, SubEventType::Clearance, sec);
        positioned(e, start, end)
    }

    #[test]
    fn test_effective_clearance() {
        let events = vec![
            restart(1, HOME_TEAM, 0.0),
            pass(2, HOME_TEAM, 2.0),
            clearance(3, 3.0, (5.0, 40.0), (50.0, 40.0)),
        ];
        assert_eq!(run(&EffectiveClearance, &events), Some(2));
    }

    #[test]
    fn test_long_diagonal_clearance() {
        // 35 forward, 52 across: 62.7 total with forward progress
        let events = vec![restart(1, HOME_TEAM, 0.0), clearance(2, 3.0, (5.0, 10.0), (40.0, 62.0))];
        assert_eq!(run(&EffectiveClearance, &events), Some(1));
    }

    #[test]
    fn test_short_or_backward_clearance() {
        let events = vec![restart(1, HOME_TEAM, 0.0), clearance(2, 3.0, (5.0, 40.0), (30.0, 45.0))];
        assert_eq!(run(&EffectiveClearance, &events), None);

        let events = vec![restart(1, HOME_TEAM, 0.0), clearance(2, 3.0, (20.0, 0.0), (10.0, 100.0))];
        assert_eq!(run(&EffectiveClearance, &events), None);
    }

    #[test]
    fn test_new_set_piece() {
        let events = vec![restart(1, HOME_TEAM, 0.0), restart(2, HOME_TEAM, 9.0)];
        assert_eq!(run(&NewSetPiece, &events), Some(1));
        assert_eq!(run(&NewSetPiece, &events[..1]), None);
    }
}
