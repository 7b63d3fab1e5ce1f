//! # setpiece_core - Set Piece Episode Pipeline
//!
//! Turns a season of Wyscout-style soccer event logs into labelled set-piece
//! episodes.
//!
//! ## Features
//! - Running score at every event, checked against half-time and full-time
//!   checkpoints from match metadata
//! - Ten ordered boundary rules deciding where each restart's episode ends
//! - Episode compilation with parallel batches and compressed backups
//! - YAML configuration for window sizes and rule thresholds

// Doc formatting lints - purely cosmetic, fix incrementally
#![allow(clippy::doc_lazy_continuation)]
// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]

pub mod config;
pub mod episode;
pub mod error;
pub mod geometry;
pub mod models;
pub mod repository;
pub mod rules;
pub mod score;
pub mod window;

#[cfg(test)]
mod test_fixtures;

// Re-export main API
pub use config::{BackupConfig, PipelineConfig, RuleThresholds, WindowConfig};
pub use episode::{CompileOptions, EpisodeCompiler, EpisodeTable, FailurePolicy};
pub use error::{EpisodeError, ErrorKind, Result};
pub use repository::{EventLog, MatchDirectory};
pub use rules::{BoundaryMatch, BoundaryRule, BoundaryRuleEngine};
pub use score::{annotate_scores, reconstruct_match_scores, AnnotatedEvent, ScoreReconstructor};
pub use window::extract_window;
