//! Known source-data defects in goal tagging.
//!
//! PATCH: each entry stands in for a goal that really happened but has no
//! tagged event in the public log. An entry only ever applies to its own
//! match id; do not add heuristics here.

use crate::models::{MatchId, MatchPeriod, Side};

/// A goal the event log is missing, placed by the period clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissingGoalPatch {
    pub match_id: MatchId,
    pub period: MatchPeriod,
    /// The goal counts from the first event at or after this second
    pub after_sec: f64,
    pub side: Side,
}

impl MissingGoalPatch {
    pub fn applies_to(&self, match_id: MatchId, period: MatchPeriod) -> bool {
        self.match_id == match_id && self.period == period
    }
}

/// Patches applied by [`ScoreReconstructor::default`](super::ScoreReconstructor).
///
/// Empty until a defect is confirmed against the source log; callers that
/// know of one pass their own table to `ScoreReconstructor::with_patches`.
pub const KNOWN_SOURCE_DEFECTS: &[MissingGoalPatch] = &[];
