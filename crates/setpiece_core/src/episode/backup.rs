//! Incremental episode backup
//!
//! Long compilations flush their rows to `<dir>/comp_<n>.msgpack.lz4` as
//! they go, so an abort late in the run keeps everything flushed before it.
//!
//! File layout: MessagePack (named fields) → LZ4 with prepended size.

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::compiler::EpisodeRow;
use crate::config::BackupConfig;
use crate::error::Result;

pub const BACKUP_EXTENSION: &str = "msgpack.lz4";

/// Contents of one backup file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackupFile {
    pub file_number: u32,
    /// RFC 3339 write time
    pub created_at: String,
    pub rows: Vec<EpisodeRow>,
}

/// What a flush wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReceipt {
    pub path: PathBuf,
    pub file_number: u32,
    pub rows: usize,
    /// SHA-256 of the bytes on disk, lowercase hex
    pub checksum: String,
}

/// Writes numbered backup files. The file counter is shared state and is
/// only touched under its lock.
#[derive(Debug)]
pub struct BackupWriter {
    dir: PathBuf,
    next_file: Mutex<u32>,
}

impl BackupWriter {
    pub fn new(config: &BackupConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            next_file: Mutex::new(config.first_file_number),
        }
    }

    pub fn path_for(&self, file_number: u32) -> PathBuf {
        self.dir.join(format!("comp_{}.{}", file_number, BACKUP_EXTENSION))
    }

    /// Number the next flush will use
    pub fn next_file_number(&self) -> u32 {
        *self.next_file.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write `rows` to the next numbered file.
    pub fn write(&self, rows: &[EpisodeRow]) -> Result<BackupReceipt> {
        let mut next_file = self.next_file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let file_number = *next_file;

        let file = BackupFile {
            file_number,
            created_at: chrono::Utc::now().to_rfc3339(),
            rows: rows.to_vec(),
        };
        let packed = to_vec_named(&file)?;
        let compressed = compress_prepend_size(&packed);
        let checksum = checksum_of(&compressed);

        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(file_number);
        fs::write(&path, &compressed)?;
        *next_file += 1;

        tracing::info!(
            path = %path.display(),
            rows = rows.len(),
            bytes = compressed.len(),
            sha256 = %checksum,
            "flushed episode backup"
        );

        Ok(BackupReceipt {
            path,
            file_number,
            rows: rows.len(),
            checksum,
        })
    }
}

fn checksum_of(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Read a backup file written by [`BackupWriter::write`].
pub fn load_backup(path: &Path) -> Result<BackupFile> {
    let compressed = fs::read(path)?;
    let packed = decompress_size_prepended(&compressed)?;
    Ok(from_slice(&packed)?)
}

/// Compare a backup file against the checksum logged when it was written.
pub fn verify_backup(path: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes = fs::read(path)?;
    Ok(checksum_of(&bytes) == expected_checksum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::Tag;
    use crate::test_fixtures::*;

    fn rows() -> Vec<EpisodeRow> {
        vec![
            EpisodeRow {
                seq_id: 1,
                event: restart(1, HOME_TEAM, 0.0),
            },
            EpisodeRow {
                seq_id: 1,
                event: tagged(shot(2, HOME_TEAM, 3.5), &[Tag::Goal]),
            },
        ]
    }

    fn writer_in(dir: &Path, first: u32) -> BackupWriter {
        BackupWriter::new(&BackupConfig {
            dir: dir.to_path_buf(),
            flush_every: 10,
            first_file_number: first,
        })
    }

    #[test]
    fn test_write_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer_in(dir.path(), 4);

        let receipt = writer.write(&rows()).unwrap();
        assert_eq!(receipt.file_number, 4);
        assert_eq!(receipt.path, dir.path().join("comp_4.msgpack.lz4"));
        assert_eq!(receipt.rows, 2);

        let loaded = load_backup(&receipt.path).unwrap();
        assert_eq!(loaded.file_number, 4);
        assert_eq!(loaded.rows, rows());
        assert!(verify_backup(&receipt.path, &receipt.checksum).unwrap());
    }

    #[test]
    fn test_counter_advances_per_flush() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer_in(&dir.path().join("nested"), 1);
        writer.write(&rows()).unwrap();
        let second = writer.write(&rows()[..1]).unwrap();
        assert_eq!(second.file_number, 2);
        assert_eq!(writer.next_file_number(), 3);
        assert!(writer.path_for(1).exists());
    }

    #[test]
    fn test_corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comp_1.msgpack.lz4");
        fs::write(&path, b"\x10\x00\x00\x00garbage").unwrap();
        let err = load_backup(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(!verify_backup(&path, "00").unwrap());
    }
}
