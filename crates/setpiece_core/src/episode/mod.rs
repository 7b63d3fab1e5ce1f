//! Episode compilation
//!
//! Every restart in the log becomes one episode: the restart row followed
//! by everything up to and including the boundary picked by the rule
//! engine. Episodes are stacked into an [`EpisodeTable`] with a shared
//! `seqId` per episode, optionally flushed to compressed backup files as
//! the run progresses.

mod backup;
mod compiler;

pub use backup::{
    load_backup, verify_backup, BackupFile, BackupReceipt, BackupWriter, BACKUP_EXTENSION,
};
pub use compiler::{
    CompileOptions, Episode, EpisodeCompiler, EpisodeRow, EpisodeSummary, EpisodeTable,
    FailurePolicy, SkippedRestart,
};
