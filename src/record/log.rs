//! Append-only typed call log of one member.

use crate::types::CallSeq;

/// One recorded call: its position in the scope journal and its arguments.
///
/// The owning double and member are implied by the log the record lives in;
/// the journal entry at `seq` carries them for cross-member views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord<A> {
    /// Position in the scope journal.
    pub seq: CallSeq,
    /// The call's arguments.
    pub args: A,
}

/// Every call of one member, in chronological order.
///
/// Sequence numbers strictly increase along the log, which makes lookups by
/// sequence a binary search.
#[derive(Debug, Clone)]
pub struct CallLog<A> {
    records: Vec<CallRecord<A>>,
}

impl<A> Default for CallLog<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> CallLog<A> {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Appends a call. Always succeeds, matches nothing. Returns the index of
    /// the new record.
    pub fn append(&mut self, seq: CallSeq, args: A) -> usize {
        debug_assert!(
            self.records.last().map_or(true, |last| last.seq < seq),
            "call sequence must increase"
        );
        self.records.push(CallRecord { seq, args });
        self.records.len() - 1
    }

    /// All records, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[CallRecord<A>] {
        &self.records
    }

    /// The record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CallRecord<A>> {
        self.records.get(index)
    }

    /// The record with sequence `seq`.
    #[must_use]
    pub fn find(&self, seq: CallSeq) -> Option<&CallRecord<A>> {
        self.records
            .binary_search_by_key(&seq, |record| record.seq)
            .ok()
            .map(|index| &self.records[index])
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<A: Clone> CallLog<A> {
    /// Snapshot of every call's arguments, oldest first.
    #[must_use]
    pub fn arguments(&self) -> Vec<A> {
        self.records.iter().map(|record| record.args.clone()).collect()
    }
}
