//! # Score Reconstructor
//!
//! Derives the running score at every event of a match and checks it
//! against the half-time and full-time scores recorded in match metadata.
//!
//! ## Periods
//! Periods are scanned in chronological order, each starting from the score
//! the previous one ended with:
//!
//! | Period | Scanned | Checkpoint after |
//! |--------|---------|------------------|
//! | 1H | always | half-time score |
//! | 2H | always | full-time score (Regular matches) |
//! | E1, E2 | ExtraTime / Penalties matches | full-time score |
//! | P | never, shootout goals are not match goals | none |
//!
//! ## Usage
//! ```rust
//! use setpiece_core::score::reconstruct_match_scores;
//! use setpiece_core::models::{DurationClass, MatchInfo, Side, TeamRecord};
//!
//! let info = MatchInfo::new(
//!     1,
//!     DurationClass::Regular,
//!     TeamRecord { team_id: 10, side: Side::Home, score_ht: 0, score: 0 },
//!     TeamRecord { team_id: 20, side: Side::Away, score_ht: 0, score: 0 },
//! );
//! let scores = reconstruct_match_scores(&[], &info).unwrap();
//! assert!(scores.is_empty());
//! ```

mod patches;

pub use patches::{MissingGoalPatch, KNOWN_SOURCE_DEFECTS};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::Range;

use crate::error::{EpisodeError, Result};
use crate::models::{
    Event, EventType, MatchId, MatchInfo, MatchPeriod, RunningScore, Side, Tag,
};
use crate::repository::{EventLog, MatchDirectory};

/// An input row plus its running score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotatedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub score: RunningScore,
}

impl AnnotatedEvent {
    /// Goals for the acting team minus goals against it, as of this event.
    pub fn score_differential(&self, info: &MatchInfo) -> Result<i64> {
        let side = team_side(&self.event, info)?;
        Ok(self.score.differential_for(side))
    }
}

/// Side credited by `event`, if it scores.
///
/// Save attempts carry the goal tag when the keeper is beaten and are
/// never counted. An own-goal tag credits the opponent of the acting team
/// and wins over a plain goal tag on the same row.
pub fn scoring_side(event: &Event, info: &MatchInfo) -> Result<Option<Side>> {
    if event.event_type == EventType::SaveAttempt {
        return Ok(None);
    }
    let own_goal = event.has_tag(Tag::OwnGoal);
    if !own_goal && !event.has_tag(Tag::Goal) {
        return Ok(None);
    }
    let side = team_side(event, info)?;
    Ok(Some(if own_goal { side.opponent() } else { side }))
}

fn team_side(event: &Event, info: &MatchInfo) -> Result<Side> {
    info.side_of(event.team_id).ok_or_else(|| {
        EpisodeError::consistency(
            Some(info.match_id),
            Some(event.id),
            format!("team {} is not part of this match", event.team_id),
        )
    })
}

/// Metadata score the reconstruction must hit once `closes_after` is over.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    closes_after: MatchPeriod,
    label: &'static str,
    expected: RunningScore,
}

fn checkpoints_for(info: &MatchInfo) -> Result<VecDeque<Checkpoint>> {
    let full_time_after = if info.duration_class.has_extra_time() {
        MatchPeriod::ExtraTimeSecond
    } else {
        MatchPeriod::SecondHalf
    };
    Ok(VecDeque::from([
        Checkpoint {
            closes_after: MatchPeriod::FirstHalf,
            label: "half-time",
            expected: info.half_time_score()?,
        },
        Checkpoint {
            closes_after: full_time_after,
            label: "full-time",
            expected: info.full_time_score()?,
        },
    ]))
}

/// Check every pending checkpoint that closes before `next_period`
/// (all of them once the match is over).
fn settle_checkpoints(
    pending: &mut VecDeque<Checkpoint>,
    next_period: Option<MatchPeriod>,
    score: RunningScore,
    match_id: MatchId,
) -> Result<()> {
    while let Some(checkpoint) = pending.front().copied() {
        if next_period.is_some_and(|p| p <= checkpoint.closes_after) {
            break;
        }
        if checkpoint.expected != score {
            return Err(EpisodeError::CheckpointMismatch {
                match_id,
                checkpoint: checkpoint.label,
                expected: checkpoint.expected,
                reconstructed: score,
            });
        }
        pending.pop_front();
    }
    Ok(())
}

/// Split a match's rows into per-period runs.
fn period_runs(events: &[Event], match_id: MatchId) -> Result<Vec<(MatchPeriod, &[Event])>> {
    let mut runs: Vec<(MatchPeriod, &[Event])> = Vec::new();
    let mut start = 0;

    for (row, event) in events.iter().enumerate() {
        if event.match_id != match_id {
            return Err(EpisodeError::consistency(
                Some(match_id),
                Some(event.id),
                format!("row belongs to match {}", event.match_id),
            ));
        }
        if row > start && event.match_period != events[start].match_period {
            runs.push((events[start].match_period, &events[start..row]));
            start = row;
        }
    }
    if start < events.len() {
        runs.push((events[start].match_period, &events[start..]));
    }

    for pair in runs.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        if after.0 <= before.0 {
            return Err(EpisodeError::consistency(
                Some(match_id),
                after.1.first().map(|e| e.id),
                format!("period {} follows period {}", after.0, before.0),
            ));
        }
    }

    Ok(runs)
}

/// Running-score reconstruction with a fixed table of source-defect patches.
#[derive(Debug, Clone, Copy)]
pub struct ScoreReconstructor<'p> {
    patches: &'p [MissingGoalPatch],
}

impl Default for ScoreReconstructor<'static> {
    fn default() -> Self {
        Self {
            patches: KNOWN_SOURCE_DEFECTS,
        }
    }
}

impl<'p> ScoreReconstructor<'p> {
    pub fn with_patches(patches: &'p [MissingGoalPatch]) -> Self {
        Self { patches }
    }

    /// One score per row of `events` (a single match, in log order).
    pub fn reconstruct(&self, events: &[Event], info: &MatchInfo) -> Result<Vec<RunningScore>> {
        info.validate()?;
        let runs = period_runs(events, info.match_id)?;
        let mut checkpoints = checkpoints_for(info)?;

        let mut score = RunningScore::default();
        let mut scores = Vec::with_capacity(events.len());
        for (period, rows) in runs {
            settle_checkpoints(&mut checkpoints, Some(period), score, info.match_id)?;
            score = self.scan_period(rows, period, score, info, &mut scores)?;
        }
        settle_checkpoints(&mut checkpoints, None, score, info.match_id)?;

        tracing::debug!(match_id = info.match_id, final_score = %score, "reconstructed match score");
        Ok(scores)
    }

    fn scan_period(
        &self,
        rows: &[Event],
        period: MatchPeriod,
        start: RunningScore,
        info: &MatchInfo,
        scores: &mut Vec<RunningScore>,
    ) -> Result<RunningScore> {
        let counted = match period {
            MatchPeriod::FirstHalf | MatchPeriod::SecondHalf => true,
            MatchPeriod::ExtraTimeFirst | MatchPeriod::ExtraTimeSecond => {
                if !info.duration_class.has_extra_time() {
                    tracing::warn!(
                        match_id = info.match_id,
                        period = %period,
                        rows = rows.len(),
                        "extra-time events in a regular match, score carried forward"
                    );
                }
                info.duration_class.has_extra_time()
            }
            MatchPeriod::Penalties => false,
        };

        if !counted {
            scores.extend(std::iter::repeat(start).take(rows.len()));
            return Ok(start);
        }

        let mut patches: Vec<&MissingGoalPatch> = self
            .patches
            .iter()
            .filter(|p| p.applies_to(info.match_id, period))
            .collect();

        let mut score = start;
        for event in rows {
            patches.retain(|patch| {
                if event.event_sec < patch.after_sec {
                    return true;
                }
                // PATCH: goal absent from the source log
                score = score.credit(patch.side);
                tracing::warn!(
                    match_id = info.match_id,
                    period = %period,
                    event_id = event.id,
                    "applied missing-goal patch"
                );
                false
            });

            if let Some(side) = scoring_side(event, info)? {
                score = score.credit(side);
                tracing::debug!(match_id = info.match_id, event_id = event.id, score = %score, "goal");
            }
            scores.push(score);
        }

        Ok(score)
    }

    /// Score-annotated copy of one match's rows.
    pub fn annotate_match(&self, events: &[Event], info: &MatchInfo) -> Result<Vec<AnnotatedEvent>> {
        let scores = self.reconstruct(events, info)?;
        Ok(events
            .iter()
            .cloned()
            .zip(scores)
            .map(|(event, score)| AnnotatedEvent { event, score })
            .collect())
    }

    /// Score-annotated copy of the whole log, in original row order.
    ///
    /// Matches are independent of each other, so with `parallel` they are
    /// reconstructed on the rayon pool.
    pub fn annotate(
        &self,
        log: &EventLog,
        matches: &MatchDirectory,
        parallel: bool,
    ) -> Result<Vec<AnnotatedEvent>> {
        let ranges = log.match_ranges()?;
        let annotate_one = |(match_id, range): &(MatchId, Range<usize>)| -> Result<Vec<AnnotatedEvent>> {
            let info = matches.get(*match_id)?;
            self.annotate_match(&log.events()[range.clone()], info)
        };

        let per_match: Vec<Vec<AnnotatedEvent>> = if parallel {
            ranges.par_iter().map(annotate_one).collect::<Result<_>>()?
        } else {
            ranges.iter().map(annotate_one).collect::<Result<_>>()?
        };

        tracing::info!(matches = per_match.len(), events = log.len(), "annotated running scores");
        Ok(per_match.into_iter().flatten().collect())
    }
}

/// [`ScoreReconstructor::reconstruct`] with the known-defect patches.
pub fn reconstruct_match_scores(events: &[Event], info: &MatchInfo) -> Result<Vec<RunningScore>> {
    ScoreReconstructor::default().reconstruct(events, info)
}

/// [`ScoreReconstructor::annotate`] with the known-defect patches.
pub fn annotate_scores(
    log: &EventLog,
    matches: &MatchDirectory,
    parallel: bool,
) -> Result<Vec<AnnotatedEvent>> {
    ScoreReconstructor::default().annotate(log, matches, parallel)
}
