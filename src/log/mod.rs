//! In-memory ordered record store.
//!
//! - `append` assigns the next offset under exclusive lock and returns the
//!   stamped record.
//! - `read` returns a snapshot that does not alias the live sequence.
//! - The log never fails; it is a pure in-memory structure.

mod record;

pub use record::Record;

use std::sync::Mutex;

/// An ordered, append-only, gap-free sequence of [`Record`]s.
#[derive(Default)]
pub struct Log {
    records: Mutex<Vec<Record>>,
}

impl Log {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Stamps `record` with the next offset, appends it, and returns the
    /// stamped copy. At most one writer runs at a time.
    pub fn append(&self, mut record: Record) -> Record {
        let mut records = self.records.lock().expect("log mutex poisoned");
        record.offset = records.len() as u64;
        records.push(record.clone());
        record
    }

    /// Returns a snapshot of the current sequence in offset order. The
    /// returned `Vec` is a copy; it does not alias the live log.
    pub fn read(&self) -> Vec<Record> {
        self.records.lock().expect("log mutex poisoned").clone()
    }

    /// Number of records currently held.
    pub fn len(&self) -> u64 {
        self.records.lock().expect("log mutex poisoned").len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends `record` at exactly `record.offset`, reconciling with
    /// whatever the log already holds there.
    ///
    /// Reconciliation rules:
    /// - If `record.offset` is beyond the current length by more than one,
    ///   this is a gap and is rejected (the caller should retry once
    ///   anti-entropy has filled the prefix).
    /// - If `record.offset` equals the current length, the record is
    ///   appended, filling the tail exactly.
    /// - If `record.offset` is before the current length, the existing
    ///   record at that offset is compared by value: equal values are a
    ///   harmless duplicate delivery (ignored); unequal values are a
    ///   divergence the caller must treat as fatal.
    pub fn reconcile(&self, record: Record) -> ReconcileOutcome {
        let mut records = self.records.lock().expect("log mutex poisoned");
        let len = records.len() as u64;

        if record.offset > len {
            return ReconcileOutcome::Gap {
                have: len,
                wanted: record.offset,
            };
        }

        if record.offset == len {
            records.push(record);
            return ReconcileOutcome::Appended;
        }

        let existing = &records[record.offset as usize];
        if existing.value == record.value {
            ReconcileOutcome::DuplicateIgnored
        } else {
            ReconcileOutcome::Diverged {
                offset: record.offset,
                existing: existing.value.clone(),
                incoming: record.value,
            }
        }
    }
}

/// Outcome of reconciling one incoming record against the local log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The record was appended at the tail.
    Appended,
    /// The record was already present with an identical value.
    DuplicateIgnored,
    /// The incoming offset is beyond the current length; caller must refuse.
    Gap { have: u64, wanted: u64 },
    /// The incoming offset held a different value than is being delivered.
    Diverged {
        offset: u64,
        existing: String,
        incoming: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_dense_offsets() {
        let log = Log::new();
        let a = log.append(Record::new("a"));
        let b = log.append(Record::new("b"));
        assert_eq!(a.offset, 0);
        assert_eq!(b.offset, 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn read_reflects_just_appended_record_at_its_offset() {
        let log = Log::new();
        let stamped = log.append(Record::new("x"));
        let snapshot = log.read();
        assert_eq!(snapshot[stamped.offset as usize], stamped);
    }

    #[test]
    fn read_is_a_snapshot_not_a_live_alias() {
        let log = Log::new();
        log.append(Record::new("a"));
        let snapshot = log.read();
        log.append(Record::new("b"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn reconcile_appends_at_exact_tail() {
        let log = Log::new();
        let outcome = log.reconcile(Record::with_offset("a", 0));
        assert_eq!(outcome, ReconcileOutcome::Appended);
    }

    #[test]
    fn reconcile_rejects_gap() {
        let log = Log::new();
        let outcome = log.reconcile(Record::with_offset("a", 3));
        assert_eq!(outcome, ReconcileOutcome::Gap { have: 0, wanted: 3 });
    }

    #[test]
    fn reconcile_ignores_idempotent_duplicate() {
        let log = Log::new();
        log.reconcile(Record::with_offset("a", 0));
        let outcome = log.reconcile(Record::with_offset("a", 0));
        assert_eq!(outcome, ReconcileOutcome::DuplicateIgnored);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn reconcile_reports_divergence() {
        let log = Log::new();
        log.reconcile(Record::with_offset("a", 0));
        let outcome = log.reconcile(Record::with_offset("b", 0));
        match outcome {
            ReconcileOutcome::Diverged { offset, .. } => assert_eq!(offset, 0),
            other => panic!("expected Diverged, got {other:?}"),
        }
    }
}
