//! Episode compiler
//!
//! Drives window extraction and the boundary rule engine over every restart
//! and stacks the resulting episodes into one `seqId`-labelled table.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Write;

use super::backup::{BackupReceipt, BackupWriter};
use crate::config::{BackupConfig, PipelineConfig, WindowConfig};
use crate::error::{EpisodeError, Result};
use crate::models::{Event, EventId, PlayerRoster};
use crate::repository::EventLog;
use crate::rules::{BoundaryMatch, BoundaryRule, BoundaryRuleEngine};
use crate::window::{ensure_time_monotonic, extract_lookahead, extract_window};

/// What to do when one restart's episode cannot be built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// The first failure ends the whole compilation
    #[default]
    Abort,
    /// Record the failure and carry on
    Skip,
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Restarts to compile; every restart in the log when `None`
    pub restart_ids: Option<Vec<EventId>>,
    /// Seq id given to the first episode
    pub seq_offset: u64,
    /// Continue a previous run: start with the restart after this one
    pub resume_after: Option<EventId>,
    pub failure_policy: FailurePolicy,
    /// Flush rows to disk every `flush_every` restarts
    pub backup: Option<BackupConfig>,
    pub parallel: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            restart_ids: None,
            seq_offset: 1,
            resume_after: None,
            failure_policy: FailurePolicy::Abort,
            backup: None,
            parallel: false,
        }
    }
}

/// One output row: an event plus the episode it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeRow {
    #[serde(rename = "seqId")]
    pub seq_id: u64,
    #[serde(flatten)]
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeSummary {
    pub seq_id: u64,
    pub restart_id: EventId,
    pub boundary_id: EventId,
    pub rule: BoundaryRule,
    pub length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedRestart {
    pub restart_id: EventId,
    pub reason: String,
}

/// Compiled episodes, rows in restart order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EpisodeTable {
    pub rows: Vec<EpisodeRow>,
    pub episodes: Vec<EpisodeSummary>,
    pub skipped: Vec<SkippedRestart>,
    /// Backup files written during compilation
    #[serde(skip)]
    pub backups: Vec<BackupReceipt>,
}

impl EpisodeTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }

    pub fn rows_for(&self, seq_id: u64) -> impl Iterator<Item = &EpisodeRow> + '_ {
        self.rows.iter().filter(move |r| r.seq_id == seq_id)
    }

    pub fn seq_ids(&self) -> Vec<u64> {
        self.rows.iter().map(|r| r.seq_id).collect()
    }

    /// Write the rows as a JSON array.
    pub fn write_rows_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, &self.rows)?;
        Ok(())
    }

    fn push(&mut self, seq_id: u64, episode: Episode<'_>) {
        self.episodes.push(EpisodeSummary {
            seq_id,
            restart_id: episode.restart_id,
            boundary_id: episode.boundary.boundary_id,
            rule: episode.boundary.rule,
            length: episode.events.len(),
        });
        self.rows.extend(episode.events.into_iter().map(|event| EpisodeRow {
            seq_id,
            event: event.clone(),
        }));
    }
}

/// A restart's events up to and including its boundary.
#[derive(Debug, Clone)]
pub struct Episode<'a> {
    pub restart_id: EventId,
    pub boundary: BoundaryMatch,
    pub events: Vec<&'a Event>,
}

pub struct EpisodeCompiler {
    engine: BoundaryRuleEngine,
    roster: PlayerRoster,
    window: WindowConfig,
}

impl EpisodeCompiler {
    pub fn new(config: &PipelineConfig, roster: PlayerRoster) -> Self {
        Self {
            engine: BoundaryRuleEngine::new(config.rules.clone()),
            roster,
            window: config.window.clone(),
        }
    }

    pub fn engine(&self) -> &BoundaryRuleEngine {
        &self.engine
    }

    pub fn roster(&self) -> &PlayerRoster {
        &self.roster
    }

    /// Boundary of one restart over the shorter checker horizon.
    pub fn locate_boundary(&self, log: &EventLog, restart_id: EventId) -> Result<BoundaryMatch> {
        self.engine.check_restart(
            log,
            &self.roster,
            restart_id,
            self.window.checker_horizon,
            self.window.lookahead,
        )
    }

    /// Build and verify the episode started by `restart_id`.
    pub fn build_episode<'a>(&self, log: &'a EventLog, restart_id: EventId) -> Result<Episode<'a>> {
        let window = extract_window(log, restart_id, self.window.episode_horizon, true)?;
        let lookahead = extract_lookahead(
            log,
            restart_id,
            self.window.episode_horizon,
            self.window.lookahead,
        )?;
        let boundary = self.engine.evaluate(&window, Some(&lookahead), &self.roster)?;

        let events = window[..=boundary.boundary_index].to_vec();
        verify_episode(&events, &boundary, window.len())?;

        Ok(Episode {
            restart_id,
            boundary,
            events,
        })
    }

    fn select_restarts(&self, log: &EventLog, options: &CompileOptions) -> Result<Vec<EventId>> {
        let ids = match &options.restart_ids {
            Some(ids) => ids.clone(),
            None => log.restart_event_ids(),
        };
        let Some(after) = options.resume_after else {
            return Ok(ids);
        };
        let pos = ids.iter().position(|&id| id == after).ok_or_else(|| {
            EpisodeError::InvalidInput(format!("resume point {} is not among the restarts", after))
        })?;
        Ok(ids[pos + 1..].to_vec())
    }

    /// Compile every selected restart into one table.
    ///
    /// Seq ids are handed out after each batch is built, in restart order,
    /// so parallel and sequential runs produce the same table. Skipped
    /// restarts do not consume a seq id.
    pub fn compile(&self, log: &EventLog, options: &CompileOptions) -> Result<EpisodeTable> {
        let restart_ids = self.select_restarts(log, options)?;
        let writer = options.backup.as_ref().map(BackupWriter::new);
        let batch_size = match &options.backup {
            Some(backup) if backup.flush_every > 0 => backup.flush_every,
            Some(_) => {
                return Err(EpisodeError::InvalidInput(
                    "backup.flush_every must be positive".to_string(),
                ))
            }
            None => restart_ids.len().max(1),
        };

        tracing::info!(
            restarts = restart_ids.len(),
            parallel = options.parallel,
            backup = writer.is_some(),
            "compiling set-piece episodes"
        );

        let mut table = EpisodeTable::default();
        let mut next_seq = options.seq_offset;

        for batch in restart_ids.chunks(batch_size) {
            let outcomes: Vec<Result<Episode<'_>>> = if options.parallel {
                batch.par_iter().map(|&id| self.build_episode(log, id)).collect()
            } else {
                batch.iter().map(|&id| self.build_episode(log, id)).collect()
            };

            let first_new_row = table.rows.len();
            for (&restart_id, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Ok(episode) => {
                        table.push(next_seq, episode);
                        next_seq += 1;
                    }
                    Err(err) if options.failure_policy == FailurePolicy::Skip => {
                        tracing::warn!(restart_id, error = %err, "skipping restart");
                        table.skipped.push(SkippedRestart {
                            restart_id,
                            reason: err.to_string(),
                        });
                    }
                    Err(err) => {
                        tracing::warn!(restart_id, error = %err, "aborting compilation");
                        return Err(err);
                    }
                }
            }

            if let Some(writer) = &writer {
                if table.rows.len() > first_new_row {
                    let receipt = writer.write(&table.rows[first_new_row..])?;
                    table.backups.push(receipt);
                }
            }
        }

        tracing::info!(
            episodes = table.episode_count(),
            rows = table.len(),
            skipped = table.skipped.len(),
            "compiled set-piece episodes"
        );
        self.engine.stats().log_summary();
        Ok(table)
    }
}

/// The boundary closes the episode, the episode fits in its window, runs
/// forward in time and stays in the restart's match and period.
fn verify_episode(events: &[&Event], boundary: &BoundaryMatch, window_len: usize) -> Result<()> {
    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        return Err(EpisodeError::InvalidInput("episode has no events".to_string()));
    };
    let fail = |event_id: EventId, message: String| {
        Err(EpisodeError::consistency(Some(first.match_id), Some(event_id), message))
    };

    if last.id != boundary.boundary_id {
        return fail(
            last.id,
            format!("episode ends at {} instead of boundary {}", last.id, boundary.boundary_id),
        );
    }
    if events.len() > window_len {
        return fail(
            first.id,
            format!("episode of {} rows exceeds its window of {}", events.len(), window_len),
        );
    }
    if let Some(stray) = events.iter().find(|e| !e.same_segment(first)) {
        return fail(
            stray.id,
            format!(
                "episode leaves match {} period {}",
                first.match_id, first.match_period
            ),
        );
    }
    ensure_time_monotonic(events)
}
