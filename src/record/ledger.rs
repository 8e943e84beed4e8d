//! Quantified verification with claim-marking.
//!
//! The ledger wraps a member's [`CallLog`] with one `claimed` bit per call.
//!
//! # Invariants
//!
//! 1. A verification considers unclaimed calls only.
//! 2. A failed verification claims nothing.
//! 3. A passed verification claims every call it counted, so each physical
//!    call satisfies at most one verification.
//! 4. Claims are never released.

use super::log::{CallLog, CallRecord};
use crate::matcher::{Matcher, Times};
use crate::types::CallSeq;

/// Outcome of [`VerifyLedger::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Unclaimed calls accepted by the matcher.
    pub observed: usize,
    /// Whether the count satisfied the times matcher (and was claimed).
    pub satisfied: bool,
}

/// Statistics about a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerStats {
    /// Calls recorded.
    pub recorded: usize,
    /// Calls claimed by a passed verification.
    pub claimed: usize,
}

impl LedgerStats {
    /// Calls not yet claimed.
    #[must_use]
    pub fn unclaimed(&self) -> usize {
        self.recorded - self.claimed
    }
}

/// A call log with claim bits.
#[derive(Debug, Clone)]
pub struct VerifyLedger<A> {
    log: CallLog<A>,
    claimed: Vec<bool>,
    stats: LedgerStats,
}

impl<A> Default for VerifyLedger<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> VerifyLedger<A> {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: CallLog::new(),
            claimed: Vec::new(),
            stats: LedgerStats::default(),
        }
    }

    /// Records a call, unclaimed.
    pub fn record(&mut self, seq: CallSeq, args: A) {
        self.log.append(seq, args);
        self.claimed.push(false);
        self.stats.recorded += 1;
    }

    /// Counts unclaimed calls accepted by `matcher` and, if `times` accepts
    /// the count, claims all of them.
    pub fn verify(&mut self, matcher: &Matcher<A>, times: &Times) -> Verdict {
        let candidates: Vec<usize> = self
            .log
            .entries()
            .iter()
            .enumerate()
            .filter(|(index, record)| !self.claimed[*index] && matcher.matches(&record.args))
            .map(|(index, _)| index)
            .collect();
        self.settle(&candidates, times)
    }

    /// Commits a count made elsewhere: if `times` accepts the number of
    /// `candidates`, claims every one of them.
    ///
    /// `candidates` are log indices, as returned with [`unclaimed`](Self::unclaimed).
    pub fn settle(&mut self, candidates: &[usize], times: &Times) -> Verdict {
        let observed = candidates.len();
        if !times.matches(observed) {
            return Verdict {
                observed,
                satisfied: false,
            };
        }
        for &index in candidates {
            self.claimed[index] = true;
        }
        self.stats.claimed += observed;
        Verdict {
            observed,
            satisfied: true,
        }
    }

    /// Log indices and arguments of every unclaimed call, oldest first.
    #[must_use]
    pub fn unclaimed(&self) -> Vec<(usize, A)>
    where
        A: Clone,
    {
        self.log
            .entries()
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.claimed[*index])
            .map(|(index, record)| (index, record.args.clone()))
            .collect()
    }

    /// Returns true if the call at `index` has been claimed.
    #[must_use]
    pub fn is_claimed(&self, index: usize) -> bool {
        self.claimed.get(index).copied().unwrap_or(false)
    }

    /// The underlying log.
    #[must_use]
    pub fn log(&self) -> &CallLog<A> {
        &self.log
    }

    /// The record with sequence `seq`.
    #[must_use]
    pub fn find(&self, seq: CallSeq) -> Option<&CallRecord<A>> {
        self.log.find(seq)
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        self.stats
    }
}
