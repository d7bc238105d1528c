// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Append-Only Framed Log
//!
//! The canonical durability primitive. Files carry a 16-byte header
//! (magic, version, reserved) followed by framed entries:
//!
//! ```text
//! [entry_id u64][payload_len u32][crc64 u64][bincode payload]
//! ```
//!
//! The checksum covers id + len + payload. Every append is flushed and
//! fsync'd before returning; no truncation or rewriting of committed
//! entries is allowed.
//!
//! # Recovery
//! - Checksum or sequence mismatch mid-file → fail closed
//! - A torn tail entry (crash mid-write) is dropped with a warning and the
//!   file is trimmed back to the last complete frame so later appends stay
//!   readable

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crc64fast::Digest;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid log header")]
    InvalidHeader,

    #[error("checksum mismatch at entry {entry}: expected {expected:016x}, found {found:016x}")]
    ChecksumMismatch {
        entry: u64,
        expected: u64,
        found: u64,
    },

    #[error("entry decode failed at entry {entry}: {reason}")]
    Decode { entry: u64, reason: String },

    #[error("entry encode failed: {0}")]
    Encode(String),

    #[error("log corrupted at offset {offset}")]
    Corrupted { offset: u64 },

    /// Replayed entries contradict each other (recovery-time check).
    #[error("recovered state is inconsistent at entry {entry}")]
    Inconsistent { entry: u64 },
}

pub type Result<T> = std::result::Result<T, PersistError>;

const LOG_VERSION: u32 = 1;

/// Entries larger than this are never written; a larger length field on
/// read is treated as corruption.
const MAX_ENTRY_BYTES: u32 = 16 * 1024 * 1024;

/// 16-byte log file header.
struct LogHeader {
    magic: u32,
    version: u32,
    reserved: u64,
}

impl LogHeader {
    const SIZE: usize = 16;

    fn new(magic: u32) -> Self {
        Self {
            magic,
            version: LOG_VERSION,
            reserved: 0,
        }
    }

    fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.reserved.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        Self {
            magic: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            version: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            reserved: u64::from_le_bytes(bytes[8..16].try_into().unwrap()),
        }
    }

    fn validate(&self, magic: u32) -> Result<()> {
        if self.magic != magic || self.version != LOG_VERSION {
            return Err(PersistError::InvalidHeader);
        }
        Ok(())
    }
}

const ENTRY_HEADER_SIZE: usize = 8 + 4 + 8;

fn entry_checksum(entry_id: u64, payload: &[u8]) -> u64 {
    let mut digest = Digest::new();
    digest.write(&entry_id.to_le_bytes());
    digest.write(&(payload.len() as u32).to_le_bytes());
    digest.write(payload);
    digest.sum64()
}

/// Append-only log writer for one entry type.
pub struct LogWriter<T> {
    path: PathBuf,
    file: File,
    next_entry: u64,
    _entry: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> LogWriter<T> {
    /// Open or create a log, validating the header and replaying all
    /// committed entries. Returns the writer (positioned for appends) and
    /// the replayed entries in commit order.
    pub fn open(path: impl AsRef<Path>, magic: u32) -> Result<(Self, Vec<T>)> {
        let path = path.as_ref().to_path_buf();
        let exists = path.exists();

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;

        let entries = if exists {
            let mut buffer = Vec::new();
            file.read_to_end(&mut buffer)?;
            let (entries, good_end) = replay(&buffer, magic)?;
            if good_end < buffer.len() as u64 {
                tracing::warn!(
                    path = %path.display(),
                    dropped = buffer.len() as u64 - good_end,
                    "dropping torn tail entry from log"
                );
                // Trim the torn frame so the next append starts on a
                // frame boundary.
                file.set_len(good_end)?;
                file.sync_data()?;
            }
            entries
        } else {
            file.write_all(&LogHeader::new(magic).to_bytes())?;
            file.sync_data()?;
            Vec::new()
        };

        use std::io::Seek;
        file.seek(io::SeekFrom::End(0))?;

        let next_entry = entries.len() as u64;
        Ok((
            Self {
                path,
                file,
                next_entry,
                _entry: PhantomData,
            },
            entries,
        ))
    }

    /// Append one entry. Only returns `Ok` after the frame is durable.
    pub fn append(&mut self, entry: &T) -> Result<u64> {
        let payload = bincode::serde::encode_to_vec(entry, bincode::config::standard())
            .map_err(|e| PersistError::Encode(e.to_string()))?;
        if payload.len() as u32 > MAX_ENTRY_BYTES {
            return Err(PersistError::Encode(format!(
                "entry exceeds frame size cap ({} bytes)",
                payload.len()
            )));
        }

        let entry_id = self.next_entry;
        let checksum = entry_checksum(entry_id, &payload);

        let mut frame = [0u8; ENTRY_HEADER_SIZE];
        frame[0..8].copy_from_slice(&entry_id.to_le_bytes());
        frame[8..12].copy_from_slice(&(payload.len() as u32).to_le_bytes());
        frame[12..20].copy_from_slice(&checksum.to_le_bytes());

        self.file.write_all(&frame)?;
        self.file.write_all(&payload)?;
        self.file.sync_data()?;

        self.next_entry += 1;
        Ok(entry_id)
    }

    pub fn entry_count(&self) -> u64 {
        self.next_entry
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Replay a full log buffer. Returns the decoded entries and the offset of
/// the end of the last complete frame (anything past it is a torn tail).
fn replay<T: DeserializeOwned>(buffer: &[u8], magic: u32) -> Result<(Vec<T>, u64)> {
    if buffer.len() < LogHeader::SIZE {
        return Err(PersistError::InvalidHeader);
    }
    let mut header_bytes = [0u8; LogHeader::SIZE];
    header_bytes.copy_from_slice(&buffer[..LogHeader::SIZE]);
    LogHeader::from_bytes(&header_bytes).validate(magic)?;

    let mut entries = Vec::new();
    let mut offset = LogHeader::SIZE;

    while offset < buffer.len() {
        let remaining = &buffer[offset..];
        if remaining.len() < ENTRY_HEADER_SIZE {
            // Torn header from a crash mid-write.
            return Ok((entries, offset as u64));
        }

        let entry_id = u64::from_le_bytes(remaining[0..8].try_into().unwrap());
        let payload_len =
            u32::from_le_bytes(remaining[8..12].try_into().unwrap());
        let checksum = u64::from_le_bytes(remaining[12..20].try_into().unwrap());

        if payload_len > MAX_ENTRY_BYTES {
            return Err(PersistError::Corrupted {
                offset: offset as u64,
            });
        }
        let payload_end = ENTRY_HEADER_SIZE + payload_len as usize;
        if remaining.len() < payload_end {
            // Torn payload.
            return Ok((entries, offset as u64));
        }

        let payload = &remaining[ENTRY_HEADER_SIZE..payload_end];
        let found = entry_checksum(entry_id, payload);
        if found != checksum {
            return Err(PersistError::ChecksumMismatch {
                entry: entry_id,
                expected: checksum,
                found,
            });
        }
        if entry_id != entries.len() as u64 {
            return Err(PersistError::Corrupted {
                offset: offset as u64,
            });
        }

        let (entry, read) =
            bincode::serde::decode_from_slice::<T, _>(payload, bincode::config::standard())
                .map_err(|e| PersistError::Decode {
                    entry: entry_id,
                    reason: e.to_string(),
                })?;
        if read != payload.len() {
            return Err(PersistError::Decode {
                entry: entry_id,
                reason: "trailing bytes in frame".into(),
            });
        }

        entries.push(entry);
        offset += payload_end;
    }

    Ok((entries, offset as u64))
}
