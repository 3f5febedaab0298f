//! Append-only audit log of [`VaultEvent`]s.
//!
//! Records are appended only by operations that succeed. Records written
//! by an operation that later rolls back are retracted by sequence number;
//! records other calls wrote in the meantime stay.

use brook_core::types::VaultEvent;
use serde::{Deserialize, Serialize};

/// One entry in the audit log.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AuditRecord {
    /// Strictly increasing, starting at zero. A retracted tail record's
    /// number is reused; one retracted from the middle leaves a gap.
    pub seq: u64,
    /// Clock reading when the record was written.
    pub timestamp: u64,
    pub event: VaultEvent,
}

#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, timestamp: u64, event: VaultEvent) -> u64 {
        let seq = self.records.last().map_or(0, |r| r.seq + 1);
        self.records.push(AuditRecord {
            seq,
            timestamp,
            event,
        });
        seq
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Records with `seq >= from`.
    pub fn since(&self, from: u64) -> &[AuditRecord] {
        let start = self.records.partition_point(|r| r.seq < from);
        &self.records[start..]
    }

    pub fn last(&self) -> Option<&AuditRecord> {
        self.records.last()
    }

    /// Remove the record numbered `seq`, if present.
    pub(crate) fn retract(&mut self, seq: u64) {
        if let Ok(idx) = self.records.binary_search_by_key(&seq, |r| r.seq) {
            self.records.remove(idx);
        }
    }
}
