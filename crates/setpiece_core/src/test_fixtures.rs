//! Test Fixtures Module
//!
//! Event, match and roster builders shared by the unit tests.
//!
//! ## Usage
//! ```ignore
//! #[cfg(test)]
//! use crate::test_fixtures::*;
//! ```

use crate::geometry::FieldPoint;
use crate::models::{
    DurationClass, Event, EventId, EventType, MatchId, MatchInfo, MatchPeriod, PlayerId,
    PlayerRole, PlayerRoster, RunningScore, Side, SubEventType, Tag, TeamId, TeamRecord,
};

// =============================================================================
// Identities
// =============================================================================

pub const MATCH_ID: MatchId = 2_499_719;
pub const OTHER_MATCH: MatchId = 2_499_720;

pub const HOME_TEAM: TeamId = 1609;
pub const AWAY_TEAM: TeamId = 1631;

pub const HOME_GK: PlayerId = 7882;
pub const HOME_DEF: PlayerId = 8325;
pub const HOME_MID: PlayerId = 3319;
pub const HOME_FWD: PlayerId = 7868;
pub const AWAY_GK: PlayerId = 8480;
pub const AWAY_DEF: PlayerId = 8653;
pub const AWAY_MID: PlayerId = 8306;

/// Roster covering every fixture player.
pub fn roster() -> PlayerRoster {
    [
        (HOME_GK, PlayerRole::Goalkeeper),
        (HOME_DEF, PlayerRole::Defender),
        (HOME_MID, PlayerRole::Midfielder),
        (HOME_FWD, PlayerRole::Forward),
        (AWAY_GK, PlayerRole::Goalkeeper),
        (AWAY_DEF, PlayerRole::Defender),
        (AWAY_MID, PlayerRole::Midfielder),
    ]
    .into_iter()
    .collect()
}

// =============================================================================
// Event Builders
// =============================================================================

/// First-half event in `MATCH_ID` by the team's midfielder.
///
/// Defaults to a short forward move in the acting team's attacking half,
/// which trips none of the boundary rules on its own.
pub fn event(
    id: EventId,
    team_id: TeamId,
    event_type: EventType,
    sub_event_type: SubEventType,
    event_sec: f64,
) -> Event {
    let player_id = if team_id == HOME_TEAM { HOME_MID } else { AWAY_MID };
    Event {
        id,
        match_id: MATCH_ID,
        team_id,
        player_id,
        event_type,
        sub_event_type,
        match_period: MatchPeriod::FirstHalf,
        event_sec,
        positions: vec![FieldPoint::new(60.0, 50.0), FieldPoint::new(65.0, 50.0)],
        tags: Vec::new(),
    }
}

/// Free kick from (70, 50).
pub fn restart(id: EventId, team_id: TeamId, event_sec: f64) -> Event {
    let e = event(id, team_id, EventType::FreeKick, SubEventType::Other(31), event_sec);
    positioned(e, (70.0, 50.0), (80.0, 50.0))
}

/// Simple pass.
pub fn pass(id: EventId, team_id: TeamId, event_sec: f64) -> Event {
    event(id, team_id, EventType::Pass, SubEventType::Other(85), event_sec)
}

/// Ground duel at the spot given, for opposing-team rows that must stay
/// in their own half.
pub fn duel_at(id: EventId, team_id: TeamId, event_sec: f64, x: f64) -> Event {
    let e = event(id, team_id, EventType::Duel, SubEventType::Other(11), event_sec);
    positioned(e, (x, 50.0), (x, 50.0))
}

pub fn shot(id: EventId, team_id: TeamId, event_sec: f64) -> Event {
    let e = event(id, team_id, EventType::Shot, SubEventType::Other(100), event_sec);
    positioned(e, (88.0, 50.0), (100.0, 50.0))
}

pub fn positioned(mut event: Event, start: (f64, f64), end: (f64, f64)) -> Event {
    event.positions = vec![FieldPoint::new(start.0, start.1), FieldPoint::new(end.0, end.1)];
    event
}

pub fn tagged(mut event: Event, tags: &[Tag]) -> Event {
    event.tags.extend_from_slice(tags);
    event
}

pub fn by_player(mut event: Event, player_id: PlayerId) -> Event {
    event.player_id = player_id;
    event
}

pub fn in_period(mut event: Event, period: MatchPeriod) -> Event {
    event.match_period = period;
    event
}

pub fn in_match(mut event: Event, match_id: MatchId) -> Event {
    event.match_id = match_id;
    event
}

pub fn refs(events: &[Event]) -> Vec<&Event> {
    events.iter().collect()
}

// =============================================================================
// Match Builders
// =============================================================================

pub fn match_with(
    duration_class: DurationClass,
    half_time: RunningScore,
    full_time: RunningScore,
) -> MatchInfo {
    MatchInfo::new(
        MATCH_ID,
        duration_class,
        TeamRecord {
            team_id: HOME_TEAM,
            side: Side::Home,
            score_ht: half_time.home,
            score: full_time.home,
        },
        TeamRecord {
            team_id: AWAY_TEAM,
            side: Side::Away,
            score_ht: half_time.away,
            score: full_time.away,
        },
    )
}

pub fn regular_match(half_time: RunningScore, full_time: RunningScore) -> MatchInfo {
    match_with(DurationClass::Regular, half_time, full_time)
}
