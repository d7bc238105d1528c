// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Append-Only Commitment Store
//!
//! Maps a content digest to the committed payload. Pure data layer.
//!
//! # Guarantees
//! - Append-only: no eviction, no mutation of existing entries
//! - Insert is idempotent (content addressing — same key, same payload)
//! - Safe for concurrent readers while a chain step is in flight

use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;

use crate::commitment::Commitment;
use crate::value::Payload;

#[derive(Default)]
pub struct CommitmentStore {
    entries: RwLock<FxHashMap<Commitment, Arc<Payload>>>,
}

impl CommitmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a (commitment, payload) pair. Returns `true` if the entry is
    /// new. Re-inserting an existing digest is a no-op: under content
    /// addressing the payload bytes are necessarily identical.
    pub fn insert(&self, commitment: Commitment, payload: Arc<Payload>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        match entries.entry(commitment) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(payload);
                true
            }
        }
    }

    pub fn get(&self, commitment: &Commitment) -> Option<Arc<Payload>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(commitment).cloned()
    }

    pub fn contains(&self, commitment: &Commitment) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(commitment)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time snapshot of all entries, for persistence and audit.
    pub fn snapshot(&self) -> Vec<(Commitment, Arc<Payload>)> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().map(|(c, p)| (*c, p.clone())).collect()
    }
}
