//! # Event Repository
//!
//! In-memory, read-only view of the event table and match metadata handed
//! over by the upstream loader. Nothing here mutates an event after
//! construction.
//!
//! ## Layout assumptions
//! - rows are sorted by (match, period, eventSec) within each match
//! - all rows of one match are contiguous
//! - event ids are globally unique (duplicates are remembered and reported
//!   when looked up)

use rustc_hash::{FxHashMap, FxHashSet};
use std::io::Read;
use std::ops::Range;
use std::path::Path;

use crate::error::{EpisodeError, Result};
use crate::models::{Event, EventId, MatchId, MatchInfo};

/// Time-ordered event table with an id index.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
    index: FxHashMap<EventId, usize>,
    duplicates: FxHashSet<EventId>,
}

impl EventLog {
    pub fn new(events: Vec<Event>) -> Self {
        let mut index = FxHashMap::default();
        index.reserve(events.len());
        let mut duplicates = FxHashSet::default();

        for (row, event) in events.iter().enumerate() {
            if index.insert(event.id, row).is_some() {
                duplicates.insert(event.id);
            }
        }

        if !duplicates.is_empty() {
            tracing::warn!(count = duplicates.len(), "event log contains duplicate ids");
        }

        Self {
            events,
            index,
            duplicates,
        }
    }

    /// Load a Wyscout events file (a JSON array of event rows).
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let events: Vec<Event> = serde_json::from_reader(reader)?;
        Ok(Self::new(events))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let log = Self::from_json_reader(std::io::BufReader::new(file))?;
        tracing::info!(path = %path.display(), events = log.len(), "loaded event log");
        Ok(log)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Row of the unique event carrying `id`.
    pub fn position_of(&self, id: EventId) -> Result<usize> {
        if id == 0 {
            return Err(EpisodeError::InvalidInput(
                "event id must be a positive integer, got 0".to_string(),
            ));
        }
        if self.duplicates.contains(&id) {
            return Err(EpisodeError::consistency(
                None,
                Some(id),
                "event id occurs more than once in the log",
            ));
        }
        self.index
            .get(&id)
            .copied()
            .ok_or_else(|| EpisodeError::InvalidInput(format!("event id {} not found in the log", id)))
    }

    pub fn get(&self, id: EventId) -> Result<&Event> {
        Ok(&self.events[self.position_of(id)?])
    }

    /// Every set-piece-initiating event, in log order.
    pub fn restart_events(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().filter(|e| e.is_restart())
    }

    pub fn restart_event_ids(&self) -> Vec<EventId> {
        self.restart_events().map(|e| e.id).collect()
    }

    /// Row range of every match, in log order.
    pub fn match_ranges(&self) -> Result<Vec<(MatchId, Range<usize>)>> {
        let mut ranges: Vec<(MatchId, Range<usize>)> = Vec::new();
        let mut seen = FxHashSet::default();

        for (row, event) in self.events.iter().enumerate() {
            match ranges.last_mut() {
                Some((match_id, range)) if *match_id == event.match_id => range.end = row + 1,
                _ => {
                    if !seen.insert(event.match_id) {
                        return Err(EpisodeError::consistency(
                            Some(event.match_id),
                            Some(event.id),
                            "rows of this match are not contiguous in the log",
                        ));
                    }
                    ranges.push((event.match_id, row..row + 1));
                }
            }
        }

        Ok(ranges)
    }

    pub fn match_ids(&self) -> Result<Vec<MatchId>> {
        Ok(self.match_ranges()?.into_iter().map(|(id, _)| id).collect())
    }

    /// All rows of one match.
    pub fn match_events(&self, match_id: MatchId) -> Result<&[Event]> {
        let range = self
            .match_ranges()?
            .into_iter()
            .find(|(id, _)| *id == match_id)
            .map(|(_, range)| range)
            .ok_or_else(|| EpisodeError::InvalidInput(format!("match {} has no events", match_id)))?;
        Ok(&self.events[range])
    }
}

/// Match metadata keyed by match id.
#[derive(Debug, Clone, Default)]
pub struct MatchDirectory {
    matches: FxHashMap<MatchId, MatchInfo>,
}

impl MatchDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: MatchInfo) {
        self.matches.insert(info.match_id, info);
    }

    pub fn get(&self, match_id: MatchId) -> Result<&MatchInfo> {
        self.matches.get(&match_id).ok_or_else(|| {
            EpisodeError::consistency(Some(match_id), None, "no metadata for this match")
        })
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Load a JSON array of match records (normalized or Wyscout layout).
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let records: Vec<MatchInfo> = serde_json::from_reader(reader)?;
        let mut directory = Self::new();
        for info in records {
            info.validate()?;
            directory.insert(info);
        }
        Ok(directory)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }
}

impl FromIterator<MatchInfo> for MatchDirectory {
    fn from_iter<I: IntoIterator<Item = MatchInfo>>(iter: I) -> Self {
        let mut directory = Self::new();
        for info in iter {
            directory.insert(info);
        }
        directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{MatchPeriod, RunningScore};
    use crate::test_fixtures::*;

    #[test]
    fn test_lookup_and_restarts() {
        let log = EventLog::new(vec![
            restart(1, HOME_TEAM, 0.0),
            pass(2, HOME_TEAM, 2.0),
            restart(3, AWAY_TEAM, 9.0),
        ]);
        assert_eq!(log.position_of(2).unwrap(), 1);
        assert_eq!(log.get(3).unwrap().team_id, AWAY_TEAM);
        assert_eq!(log.restart_event_ids(), vec![1, 3]);
    }

    #[test]
    fn test_bad_ids() {
        let log = EventLog::new(vec![restart(1, HOME_TEAM, 0.0), pass(1, HOME_TEAM, 2.0)]);
        assert_eq!(log.position_of(0).unwrap_err().kind(), ErrorKind::InputValidation);
        assert_eq!(log.position_of(42).unwrap_err().kind(), ErrorKind::InputValidation);
        assert_eq!(log.position_of(1).unwrap_err().kind(), ErrorKind::DataConsistency);
    }

    #[test]
    fn test_match_ranges() {
        let mut other = pass(10, HOME_TEAM, 1.0);
        other.match_id = OTHER_MATCH;
        let log = EventLog::new(vec![
            restart(1, HOME_TEAM, 0.0),
            pass(2, HOME_TEAM, 2.0),
            other,
        ]);
        let ranges = log.match_ranges().unwrap();
        assert_eq!(ranges, vec![(MATCH_ID, 0..2), (OTHER_MATCH, 2..3)]);
        assert_eq!(log.match_events(OTHER_MATCH).unwrap().len(), 1);
        assert!(log.match_events(999).is_err());
        assert_eq!(log.match_ids().unwrap(), vec![MATCH_ID, OTHER_MATCH]);
    }

    #[test]
    fn test_interleaved_matches_rejected() {
        let mut other = pass(10, HOME_TEAM, 1.0);
        other.match_id = OTHER_MATCH;
        let log = EventLog::new(vec![restart(1, HOME_TEAM, 0.0), other, pass(2, HOME_TEAM, 2.0)]);
        assert_eq!(log.match_ranges().unwrap_err().kind(), ErrorKind::DataConsistency);
    }

    #[test]
    fn test_load_from_json() {
        let raw = r#"[
            {"id": 5, "matchId": 1, "teamId": 2, "playerId": 0, "eventId": 3, "subEventId": 36,
             "matchPeriod": "2H", "eventSec": 12.0, "positions": [{"x": 0, "y": 0}], "tags": []}
        ]"#;
        let log = EventLog::from_json_reader(raw.as_bytes()).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.events()[0].match_period, MatchPeriod::SecondHalf);
    }

    #[test]
    fn test_match_directory() {
        let directory: MatchDirectory = [regular_match(RunningScore::new(0, 0), RunningScore::new(0, 1))]
            .into_iter()
            .collect();
        assert_eq!(directory.len(), 1);
        assert!(directory.get(MATCH_ID).is_ok());
        assert_eq!(directory.get(1).unwrap_err().kind(), ErrorKind::DataConsistency);
    }
}
