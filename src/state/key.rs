// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! State keys and values with their canonical byte encoding.
//!
//! Storage adapters persist the bytes returned by `encode`, so the encoding
//! is part of consensus: bincode 2, standard config, serde mode.

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, KernelResult};
use crate::types::{Archive, ArchiveHash, ParticipantId, RecordTime, SubmissionId};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StateKey {
    /// A committed archive, keyed by its content hash.
    Archive(ArchiveHash),
    /// Marks a (participant, submission) pair as processed.
    SubmissionDedup {
        participant_id: ParticipantId,
        submission_id: SubmissionId,
    },
}

impl StateKey {
    pub fn archive(hash: &ArchiveHash) -> Self {
        StateKey::Archive(hash.clone())
    }

    pub fn dedup(participant_id: &ParticipantId, submission_id: &SubmissionId) -> Self {
        StateKey::SubmissionDedup {
            participant_id: participant_id.clone(),
            submission_id: submission_id.clone(),
        }
    }

    pub fn encode(&self) -> KernelResult<Vec<u8>> {
        encode(self)
    }

    pub fn decode(bytes: &[u8]) -> KernelResult<Self> {
        decode(bytes)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateValue {
    Archive(Archive),
    /// `record_time` is `None` until a pre-executed outcome is finalized.
    SubmissionDedup { record_time: Option<RecordTime> },
}

impl StateValue {
    pub fn encode(&self) -> KernelResult<Vec<u8>> {
        encode(self)
    }

    pub fn decode(bytes: &[u8]) -> KernelResult<Self> {
        decode(bytes)
    }
}

pub(crate) fn encode<T: Serialize>(value: &T) -> KernelResult<Vec<u8>> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| KernelError::Encoding(e.to_string()))
}

pub(crate) fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> KernelResult<T> {
    let (value, read) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|e| KernelError::Decoding(e.to_string()))?;
    if read != bytes.len() {
        return Err(KernelError::Decoding(format!(
            "{} trailing bytes after value",
            bytes.len() - read
        )));
    }
    Ok(value)
}
