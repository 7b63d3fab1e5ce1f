use thiserror::Error;

use crate::models::{EventId, MatchId, RunningScore};

/// Coarse error classes callers use to pick a batch policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad argument at the call boundary; fix and resubmit.
    InputValidation,
    /// The source log contradicts itself (ordering, duplicate ids, shape).
    DataConsistency,
    /// No termination rule fired for an episode.
    BoundaryNotFound,
    /// Reconstructed score disagrees with the match metadata.
    CheckpointMismatch,
    /// Filesystem or (de)serialization failure around the core.
    Storage,
}

#[derive(Error, Debug)]
pub enum EpisodeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Data consistency error (match {match_id:?}, event {event_id:?}): {message}")]
    DataConsistency {
        match_id: Option<MatchId>,
        event_id: Option<EventId>,
        message: String,
    },

    #[error("No boundary rule fired for the set piece starting at event {restart_id}")]
    BoundaryNotFound { restart_id: EventId },

    #[error(
        "Score checkpoint mismatch in match {match_id} after {checkpoint}: expected {expected}, reconstructed {reconstructed}"
    )]
    CheckpointMismatch {
        match_id: MatchId,
        checkpoint: &'static str,
        expected: RunningScore,
        reconstructed: RunningScore,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Backup serialization error: {0}")]
    BackupEncode(#[from] rmp_serde::encode::Error),

    #[error("Backup deserialization error: {0}")]
    BackupDecode(#[from] rmp_serde::decode::Error),

    #[error("Backup decompression error: {0}")]
    Decompression(#[from] lz4_flex::block::DecompressError),
}

impl EpisodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EpisodeError::InvalidInput(_) => ErrorKind::InputValidation,
            EpisodeError::DataConsistency { .. } => ErrorKind::DataConsistency,
            EpisodeError::BoundaryNotFound { .. } => ErrorKind::BoundaryNotFound,
            EpisodeError::CheckpointMismatch { .. } => ErrorKind::CheckpointMismatch,
            EpisodeError::Io(_)
            | EpisodeError::Json(_)
            | EpisodeError::Yaml(_)
            | EpisodeError::BackupEncode(_)
            | EpisodeError::BackupDecode(_)
            | EpisodeError::Decompression(_) => ErrorKind::Storage,
        }
    }

    /// Nothing in the core is retried; only storage failures are worth a
    /// second attempt by the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Storage)
    }

    pub(crate) fn consistency(
        match_id: Option<MatchId>,
        event_id: Option<EventId>,
        message: impl Into<String>,
    ) -> Self {
        EpisodeError::DataConsistency {
            match_id,
            event_id,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EpisodeError>;
