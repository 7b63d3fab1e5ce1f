use serde::{Deserialize, Serialize};

use crate::geometry::FieldPoint;

pub type EventId = u64;
pub type MatchId = u64;
pub type TeamId = u64;
/// 0 marks an untracked player.
pub type PlayerId = u64;

/// Timed segment of a match, in chronological order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchPeriod {
    #[serde(rename = "1H")]
    FirstHalf,
    #[serde(rename = "2H")]
    SecondHalf,
    #[serde(rename = "E1")]
    ExtraTimeFirst,
    #[serde(rename = "E2")]
    ExtraTimeSecond,
    #[serde(rename = "P")]
    Penalties,
}

impl MatchPeriod {
    pub fn code(&self) -> &'static str {
        match self {
            MatchPeriod::FirstHalf => "1H",
            MatchPeriod::SecondHalf => "2H",
            MatchPeriod::ExtraTimeFirst => "E1",
            MatchPeriod::ExtraTimeSecond => "E2",
            MatchPeriod::Penalties => "P",
        }
    }

    pub fn is_extra_time(&self) -> bool {
        matches!(
            self,
            MatchPeriod::ExtraTimeFirst | MatchPeriod::ExtraTimeSecond
        )
    }
}

impl std::fmt::Display for MatchPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Primary event type (`eventId` on the wire).
///
/// Only the codes the episode and score logic look at get their own
/// variant; everything else round-trips through `Other`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "u16", into = "u16")]
pub enum EventType {
    Duel,
    Foul,
    /// Set piece group: corners, free kicks, throw-ins, goal kicks, penalties
    FreeKick,
    GoalkeeperLeavingLine,
    Interruption,
    Offside,
    OthersOnTheBall,
    Pass,
    SaveAttempt,
    Shot,
    Other(u16),
}

impl From<u16> for EventType {
    fn from(code: u16) -> Self {
        match code {
            1 => EventType::Duel,
            2 => EventType::Foul,
            3 => EventType::FreeKick,
            4 => EventType::GoalkeeperLeavingLine,
            5 => EventType::Interruption,
            6 => EventType::Offside,
            7 => EventType::OthersOnTheBall,
            8 => EventType::Pass,
            9 => EventType::SaveAttempt,
            10 => EventType::Shot,
            other => EventType::Other(other),
        }
    }
}

impl From<EventType> for u16 {
    fn from(kind: EventType) -> Self {
        match kind {
            EventType::Duel => 1,
            EventType::Foul => 2,
            EventType::FreeKick => 3,
            EventType::GoalkeeperLeavingLine => 4,
            EventType::Interruption => 5,
            EventType::Offside => 6,
            EventType::OthersOnTheBall => 7,
            EventType::Pass => 8,
            EventType::SaveAttempt => 9,
            EventType::Shot => 10,
            EventType::Other(code) => code,
        }
    }
}

/// Secondary event type (`subEventId` on the wire).
///
/// A few interruption rows carry an empty string instead of a code; those
/// load as `Other(0)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "RawCode", into = "u16")]
pub enum SubEventType {
    BallOutOfField,
    Whistle,
    Clearance,
    Other(u16),
}

impl From<u16> for SubEventType {
    fn from(code: u16) -> Self {
        match code {
            50 => SubEventType::BallOutOfField,
            51 => SubEventType::Whistle,
            71 => SubEventType::Clearance,
            other => SubEventType::Other(other),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Number(u16),
    Text(String),
}

impl TryFrom<RawCode> for SubEventType {
    type Error = String;

    fn try_from(raw: RawCode) -> Result<Self, Self::Error> {
        match raw {
            RawCode::Number(code) => Ok(SubEventType::from(code)),
            RawCode::Text(text) if text.trim().is_empty() => Ok(SubEventType::Other(0)),
            RawCode::Text(text) => text
                .trim()
                .parse::<u16>()
                .map(SubEventType::from)
                .map_err(|_| format!("invalid subEventId `{}`", text)),
        }
    }
}

impl From<SubEventType> for u16 {
    fn from(kind: SubEventType) -> Self {
        match kind {
            SubEventType::BallOutOfField => 50,
            SubEventType::Whistle => 51,
            SubEventType::Clearance => 71,
            SubEventType::Other(code) => code,
        }
    }
}

/// Qualifier attached to an event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "TagRecord", into = "TagRecord")]
pub enum Tag {
    Goal,
    OwnGoal,
    /// On a save attempt this marks the keeper actually saving the shot.
    Accurate,
    CounterAttack,
    Other(u16),
}

impl Tag {
    pub fn code(&self) -> u16 {
        match self {
            Tag::Goal => 101,
            Tag::OwnGoal => 102,
            Tag::Accurate => 1801,
            Tag::CounterAttack => 1901,
            Tag::Other(code) => *code,
        }
    }

    pub fn from_code(code: u16) -> Self {
        match code {
            101 => Tag::Goal,
            102 => Tag::OwnGoal,
            1801 => Tag::Accurate,
            1901 => Tag::CounterAttack,
            other => Tag::Other(other),
        }
    }
}

/// Wire shape of a tag: `{"id": 101}`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct TagRecord {
    id: u16,
}

impl From<TagRecord> for Tag {
    fn from(record: TagRecord) -> Self {
        Tag::from_code(record.id)
    }
}

impl From<Tag> for TagRecord {
    fn from(tag: Tag) -> Self {
        TagRecord { id: tag.code() }
    }
}

/// One on-ball action from the event log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub match_id: MatchId,
    pub team_id: TeamId,
    #[serde(default)]
    pub player_id: PlayerId,
    #[serde(rename = "eventId")]
    pub event_type: EventType,
    #[serde(rename = "subEventId")]
    pub sub_event_type: SubEventType,
    pub match_period: MatchPeriod,
    /// Seconds since the start of the current period
    pub event_sec: f64,
    /// Start point, optionally followed by the end point
    pub positions: Vec<FieldPoint>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Event {
    pub fn start(&self) -> FieldPoint {
        self.positions.first().copied().unwrap_or_default()
    }

    /// End point; events without one end where they start.
    pub fn end(&self) -> FieldPoint {
        self.positions.get(1).copied().unwrap_or_else(|| self.start())
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn is_restart(&self) -> bool {
        self.event_type == EventType::FreeKick
    }

    pub fn same_segment(&self, other: &Event) -> bool {
        self.match_id == other.match_id && self.match_period == other.match_period
    }
}
