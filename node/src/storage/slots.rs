// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Slot-Backed Ledger State
//!
//! Maps variable-length state values onto a host that only offers fixed
//! 32-byte storage words (contract account storage).
//!
//! # Layout
//! ```text
//! base     = BLAKE3(canonical key bytes)
//! base + 0 : value length, 256-bit big-endian
//! base + 1 : bytes [0, 32)
//! base + 2 : bytes [32, 64)
//! ...        last chunk zero-padded
//! ```
//! A zero length word means "absent". Unset words read as zero, so values
//! made entirely of zero bytes still round-trip exactly through the length.

use std::collections::HashMap;

use upload_kernel::error::{KernelError, KernelResult};
use upload_kernel::state::{LedgerState, StateKey, StateValue, WriteSet};

pub type Slot = [u8; 32];

const ZERO: Slot = [0u8; 32];

/// Host storage of 32-byte words.
pub trait SlotStorage {
    /// Unset addresses read as all zeroes.
    fn get_slot(&self, address: &Slot) -> Slot;

    fn set_slot(&mut self, address: Slot, value: Slot);
}

#[derive(Clone, Debug, Default)]
pub struct MemorySlots {
    slots: HashMap<Slot, Slot>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-zero words held.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl SlotStorage for MemorySlots {
    fn get_slot(&self, address: &Slot) -> Slot {
        self.slots.get(address).copied().unwrap_or(ZERO)
    }

    fn set_slot(&mut self, address: Slot, value: Slot) {
        if value == ZERO {
            self.slots.remove(&address);
        } else {
            self.slots.insert(address, value);
        }
    }
}

pub struct SlotLedgerState<S: SlotStorage> {
    slots: S,
}

impl<S: SlotStorage> SlotLedgerState<S> {
    pub fn new(slots: S) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    pub fn into_inner(self) -> S {
        self.slots
    }

    /// Raw bytes stored under `key`, `None` if absent.
    pub fn read_bytes(&self, key: &[u8]) -> KernelResult<Option<Vec<u8>>> {
        let base = base_address(key);
        let len = decode_len(&self.slots.get_slot(&base))?;
        if len == 0 {
            return Ok(None);
        }

        let mut out = Vec::with_capacity(chunk_count(len) * 32);
        for i in 0..chunk_count(len) {
            out.extend_from_slice(&self.slots.get_slot(&offset(&base, i as u64 + 1)));
        }
        out.truncate(len);
        Ok(Some(out))
    }

    /// Stores raw bytes under `key`, zeroing chunks left over from a longer
    /// previous value. An empty value deletes the entry.
    pub fn write_bytes(&mut self, key: &[u8], value: &[u8]) -> KernelResult<()> {
        let base = base_address(key);
        let old_chunks = chunk_count(decode_len(&self.slots.get_slot(&base))?);

        for (i, chunk) in value.chunks(32).enumerate() {
            let mut word = ZERO;
            word[..chunk.len()].copy_from_slice(chunk);
            self.slots.set_slot(offset(&base, i as u64 + 1), word);
        }
        for i in chunk_count(value.len())..old_chunks {
            self.slots.set_slot(offset(&base, i as u64 + 1), ZERO);
        }

        self.slots.set_slot(base, encode_len(value.len()));
        Ok(())
    }
}

impl<S: SlotStorage> LedgerState for SlotLedgerState<S> {
    fn get(&self, key: &StateKey) -> KernelResult<Option<StateValue>> {
        match self.read_bytes(&key.encode()?)? {
            Some(bytes) => Ok(Some(StateValue::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn apply(&mut self, writes: WriteSet) -> KernelResult<()> {
        // Encode everything before the first slot is touched.
        let encoded = writes
            .iter()
            .map(|(k, v)| -> KernelResult<(Vec<u8>, Vec<u8>)> { Ok((k.encode()?, v.encode()?)) })
            .collect::<KernelResult<Vec<_>>>()?;

        for (key, value) in encoded {
            self.write_bytes(&key, &value)?;
        }
        Ok(())
    }
}

fn base_address(key: &[u8]) -> Slot {
    *blake3::hash(key).as_bytes()
}

fn chunk_count(len: usize) -> usize {
    len.div_ceil(32)
}

fn encode_len(len: usize) -> Slot {
    let mut word = ZERO;
    word[24..].copy_from_slice(&(len as u64).to_be_bytes());
    word
}

fn decode_len(word: &Slot) -> KernelResult<usize> {
    if word[..24].iter().any(|b| *b != 0) {
        return Err(KernelError::Decoding("slot length word out of range".to_string()));
    }
    let mut len = [0u8; 8];
    len.copy_from_slice(&word[24..]);
    usize::try_from(u64::from_be_bytes(len))
        .map_err(|_| KernelError::Decoding("slot length exceeds address space".to_string()))
}

/// `base + n` as a 256-bit big-endian integer, wrapping.
fn offset(base: &Slot, n: u64) -> Slot {
    let mut out = *base;
    let mut carry = n as u128;
    for byte in out.iter_mut().rev() {
        if carry == 0 {
            break;
        }
        let sum = *byte as u128 + (carry & 0xFF);
        *byte = sum as u8;
        carry = (carry >> 8) + (sum >> 8);
    }
    out
}
