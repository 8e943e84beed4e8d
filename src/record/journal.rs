//! The scope-wide journal of calls across every double.
//!
//! One lock serializes appends, so journal order is the real call order
//! across doubles even when calls come from several threads. A call's
//! [`CallSeq`] is its position here; member logs store the same sequence
//! so the typed arguments of a journal entry can be found again.
//!
//! The lock is reentrant: code running under [`Journal::record`] on the
//! recording thread (matchers, in particular) may read the journal again.
//! The entries themselves are only borrowed for the duration of a single
//! read or push, never across user code.

use core::cell::RefCell;
use core::fmt;

use parking_lot::ReentrantMutex;

use crate::types::{CallSeq, DoubleId, MemberId};

/// One call, as seen across doubles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Position in the journal.
    pub seq: CallSeq,
    /// The double called.
    pub double: DoubleId,
    /// The member called.
    pub member: MemberId,
    /// `Debug` rendering of the arguments.
    pub arguments: String,
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} <- {}",
            self.seq, self.double, self.member, self.arguments
        )
    }
}

/// Append-only cross-double call list.
pub struct Journal {
    entries: ReentrantMutex<RefCell<Vec<JournalEntry>>>,
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

impl Journal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: ReentrantMutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Appends a call and runs `then` with its sequence while the journal
    /// is still locked.
    ///
    /// Everything `then` does (member log append, stub resolution) is
    /// ordered with the append itself. Other threads wait until `then`
    /// returns; the recording thread may re-enter the journal from it.
    pub fn record<T>(
        &self,
        double: DoubleId,
        member: &MemberId,
        arguments: String,
        then: impl FnOnce(CallSeq) -> T,
    ) -> T {
        let guard = self.entries.lock();
        let seq = {
            let mut entries = guard.borrow_mut();
            let seq = CallSeq::from_position(entries.len());
            entries.push(JournalEntry {
                seq,
                double,
                member: member.clone(),
                arguments,
            });
            seq
        };
        then(seq)
    }

    /// Runs `read` over the entries while holding the journal lock.
    ///
    /// `read` must not record calls; it sees the entries borrowed.
    pub fn with_entries<T>(&self, read: impl FnOnce(&[JournalEntry]) -> T) -> T {
        let guard = self.entries.lock();
        let entries = guard.borrow();
        read(entries.as_slice())
    }

    /// Entries of `double`, oldest first.
    #[must_use]
    pub fn entries_of(&self, double: DoubleId) -> Vec<JournalEntry> {
        self.with_entries(|entries| {
            entries
                .iter()
                .filter(|entry| entry.double == double)
                .cloned()
                .collect()
        })
    }

    /// Total number of calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.with_entries(<[JournalEntry]>::len)
    }

    /// Returns true if no call was made.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.with_entries(<[JournalEntry]>::is_empty)
    }
}

impl fmt::Debug for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("len", &self.len())
            .finish()
    }
}
