// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Content-addressed code bundle.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::types::id::ArchiveHash;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    pub hash: ArchiveHash,
    pub payload: Vec<u8>,
}

impl Archive {
    pub fn new(hash: impl Into<ArchiveHash>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            hash: hash.into(),
            payload: payload.into(),
        }
    }

    /// What makes this archive unfit for the ledger, if anything.
    pub fn validation_error(&self) -> Option<&'static str> {
        match (self.hash.is_empty(), self.payload.is_empty()) {
            (false, false) => None,
            (true, true) => Some("empty hash and empty payload"),
            (true, false) => Some("empty hash"),
            (false, true) => Some("empty payload"),
        }
    }
}

// Payloads can be megabytes; keep Debug output to the identifying parts.
impl fmt::Debug for Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archive")
            .field("hash", &self.hash)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}
