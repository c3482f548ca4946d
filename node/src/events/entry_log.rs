// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Append-Only Log-Entry Writer
//!
//! - Entries are written to disk BEFORE their writes reach ledger state
//! - Every append is fsync'd
//! - No truncation or rewriting
//! - Canonical kernel encoding, length-prefixed
//!
//! # File Format
//! ```text
//! [Header: 16 bytes][len u32 LE][Entry][len u32 LE][Entry]...
//! ```
//!
//! Header:
//! - version: u32 (1)
//! - encoding: u32 (1 = bincode standard)
//! - reserved: u64 (0)

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use upload_kernel::error::KernelError;
use upload_kernel::log_entry::LogEntry;

const LOG_VERSION: u32 = 1;
const ENCODING_BINCODE_STANDARD: u32 = 1;
const HEADER_LEN: usize = 16;
const FRAME_PREFIX_LEN: usize = 4;

#[derive(Error, Debug)]
pub enum EventLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] KernelError),

    #[error("Invalid header")]
    InvalidHeader,

    #[error("Truncated entry at offset {offset}")]
    Truncated { offset: usize },
}

pub type Result<T> = std::result::Result<T, EventLogError>;

/// Log File Header (16 bytes)
#[repr(C)]
struct EntryLogHeader {
    version: u32,
    encoding: u32,
    reserved: u64,
}

impl EntryLogHeader {
    fn new() -> Self {
        Self {
            version: LOG_VERSION,
            encoding: ENCODING_BINCODE_STANDARD,
            reserved: 0,
        }
    }

    fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.version.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.encoding.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.reserved.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8; HEADER_LEN]) -> Self {
        let mut version = [0u8; 4];
        let mut encoding = [0u8; 4];
        let mut reserved = [0u8; 8];
        version.copy_from_slice(&bytes[0..4]);
        encoding.copy_from_slice(&bytes[4..8]);
        reserved.copy_from_slice(&bytes[8..16]);
        Self {
            version: u32::from_le_bytes(version),
            encoding: u32::from_le_bytes(encoding),
            reserved: u64::from_le_bytes(reserved),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.version != LOG_VERSION || self.encoding != ENCODING_BINCODE_STANDARD {
            return Err(EventLogError::InvalidHeader);
        }
        Ok(())
    }
}

/// Append-Only Log-Entry Writer
pub struct LogEntryWriter {
    path: PathBuf,
    file: BufWriter<File>,
    entry_count: u64,
}

impl LogEntryWriter {
    /// Open or create a log-entry file
    ///
    /// An existing non-empty file has its header validated and its entries
    /// counted; anything else gets a fresh header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::recover(path).map(|(writer, _)| writer)
    }

    /// Like [`LogEntryWriter::open`], but also hands back the entries already
    /// on disk. The file is read and decoded once.
    pub fn recover(path: impl AsRef<Path>) -> Result<(Self, Vec<LogEntry>)> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)?;

        let mut existing = Vec::new();

        if file.metadata()?.len() > 0 {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            existing = decode_entries(&bytes)?;
        } else {
            file.write_all(&EntryLogHeader::new().to_bytes())?;
            file.sync_all()?; // fsync header
        }

        let writer = Self {
            path,
            file: BufWriter::new(file),
            entry_count: existing.len() as u64,
        };
        Ok((writer, existing))
    }

    /// Append one entry and fsync. Only returns Ok() after a durable write.
    pub fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let bytes = entry.encode()?;

        self.file.write_all(&(bytes.len() as u32).to_le_bytes())?;
        self.file.write_all(&bytes)?;
        self.file.flush()?;
        self.file.get_ref().sync_all()?;

        self.entry_count += 1;
        Ok(())
    }

    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads every entry in a log-entry file, in append order.
pub fn read_log_entries(path: impl AsRef<Path>) -> Result<Vec<LogEntry>> {
    let bytes = std::fs::read(path)?;
    decode_entries(&bytes)
}

fn decode_entries(bytes: &[u8]) -> Result<Vec<LogEntry>> {
    if bytes.len() < HEADER_LEN {
        return Err(EventLogError::InvalidHeader);
    }
    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(&bytes[..HEADER_LEN]);
    EntryLogHeader::from_bytes(&header).validate()?;

    let mut entries = Vec::new();
    let mut offset = HEADER_LEN;

    while offset < bytes.len() {
        if bytes.len() - offset < FRAME_PREFIX_LEN {
            return Err(EventLogError::Truncated { offset });
        }
        let mut prefix = [0u8; FRAME_PREFIX_LEN];
        prefix.copy_from_slice(&bytes[offset..offset + FRAME_PREFIX_LEN]);
        let len = u32::from_le_bytes(prefix) as usize;

        let start = offset + FRAME_PREFIX_LEN;
        if bytes.len() - start < len {
            return Err(EventLogError::Truncated { offset });
        }
        entries.push(LogEntry::decode(&bytes[start..start + len])?);
        offset = start + len;
    }

    Ok(entries)
}
