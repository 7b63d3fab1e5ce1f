pub mod event;
pub mod match_info;
pub mod player;
pub mod score;

pub use event::{
    Event, EventId, EventType, MatchId, MatchPeriod, PlayerId, SubEventType, Tag, TeamId,
};
pub use match_info::{DurationClass, MatchInfo, Side, TeamRecord};
pub use player::{PlayerRole, PlayerRoster, RoleNotation};
pub use score::RunningScore;
