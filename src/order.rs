//! In-order verification across doubles.
//!
//! An [`OrderSession`] walks the scope journal with one cursor shared by all
//! participating doubles. Each passed verification moves the cursor just
//! past the last call it counted, so later verifications can only count
//! calls made after it. Calls of other members are skipped, never consumed.
//!
//! # Invariants
//!
//! 1. The cursor only moves forward.
//! 2. A failed verification leaves the cursor where it was.
//! 3. Only participants can be verified; anything else halts the test.
//!
//! Sessions are independent of per-member claims: a call claimed by
//! [`Member::verify`] still counts here and the other way round.

use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::double::{Member, ScopeShared};
use crate::error::{Error, Result};
use crate::matcher::{IntoMatcher, Matcher, Times};
use crate::record::JournalEntry;
use crate::record::VerifyLedger;
use crate::stub::Effect;
use crate::tracing_compat::{debug, debug_span};
use crate::types::{DoubleId, MemberId};

/// Cross-double sequence verification with one monotonic cursor.
///
/// Created by [`Scope::in_order`](crate::Scope::in_order).
pub struct OrderSession {
    shared: Arc<ScopeShared>,
    participants: BTreeMap<DoubleId, Arc<str>>,
    cursor: usize,
}

/// Result of scanning the journal from the cursor.
struct Scan {
    count: usize,
    last: Option<usize>,
}

impl OrderSession {
    pub(crate) fn new(shared: Arc<ScopeShared>, participants: BTreeMap<DoubleId, Arc<str>>) -> Self {
        debug!(
            participants = participants.len(),
            "in-order session started"
        );
        Self {
            shared,
            participants,
            cursor: 0,
        }
    }

    /// Journal position the next verification starts scanning from.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns true if `double` takes part in the session.
    #[must_use]
    pub fn contains(&self, double: DoubleId) -> bool {
        self.participants.contains_key(&double)
    }

    /// Participating doubles, by id.
    pub fn participants(&self) -> impl Iterator<Item = DoubleId> + '_ {
        self.participants.keys().copied()
    }

    /// Verifies that calls of `member` accepted by `matcher` occur after
    /// the cursor in a number `times` accepts.
    ///
    /// Scanning stops as soon as the count satisfies `times`; the cursor
    /// then moves past the last counted call. If nothing was counted and
    /// `times` accepts zero, the cursor stays put.
    ///
    /// # Panics
    ///
    /// Halts the test if `member` belongs to a double outside the session.
    pub fn verify<A, R, K>(
        &mut self,
        member: &Member<A, R, K>,
        matcher: impl IntoMatcher<A>,
        times: Times,
    ) -> Result<usize>
    where
        A: Clone + fmt::Debug + Send + Sync + 'static,
        K: Effect<R>,
    {
        if !member.belongs_to(&self.shared) || !self.contains(member.double()) {
            self.shared.halt(
                Error::not_in_session(member.owner(), member.double(), member.id()),
                None,
            );
        }
        let matcher = matcher.into_matcher();
        let span = debug_span!("in_order_verify", member = %member.id(), cursor = self.cursor);
        let _guard = span.enter();

        let cursor = self.cursor;
        let calls = self.shared.journal.with_entries(|entries| {
            member.with_ledger(|ledger| {
                calls_from(entries, cursor, member.double(), member.id(), ledger)
            })
        });
        let scan = count_accepted(&calls, &matcher, &times);

        if !times.matches(scan.count) {
            let failure = Error::order_mismatch(
                member.owner(),
                member.double(),
                member.id(),
                matcher.description(),
                times.description(),
                scan.count,
                cursor,
            );
            return self.shared.fail(failure, member.double());
        }
        if let Some(last) = scan.last {
            self.cursor = last + 1;
        }
        debug!(
            member = %member.id(),
            observed = scan.count,
            cursor = self.cursor,
            "in-order verification passed"
        );
        Ok(scan.count)
    }
}

/// Journal positions and arguments of the member's calls at or after
/// `cursor`.
fn calls_from<A: Clone>(
    entries: &[JournalEntry],
    cursor: usize,
    double: DoubleId,
    member: &MemberId,
    ledger: &VerifyLedger<A>,
) -> Vec<(usize, A)> {
    entries
        .iter()
        .enumerate()
        .skip(cursor)
        .filter(|(_, entry)| entry.double == double && entry.member == *member)
        .filter_map(|(index, entry)| {
            ledger
                .find(entry.seq)
                .map(|record| (index, record.args.clone()))
        })
        .collect()
}

// Runs with no journal or member state borrowed: matchers may read the scope.
fn count_accepted<A>(calls: &[(usize, A)], matcher: &Matcher<A>, times: &Times) -> Scan {
    let mut scan = Scan {
        count: 0,
        last: None,
    };
    for (index, args) in calls {
        if !matcher.matches(args) {
            continue;
        }
        scan.count += 1;
        scan.last = Some(*index);
        if times.matches(scan.count) {
            break;
        }
    }
    scan
}

impl fmt::Debug for OrderSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderSession")
            .field("participants", &self.participants)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::matcher::{any, at_least, at_most, eq, never, times};
    use crate::stub::Blocking;
    use crate::test_utils::{collecting_scope, init_test_logging};
    use crate::{Member, Scope};

    fn init_test(name: &str) {
        init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn follows_real_call_order_across_doubles() {
        init_test("follows_real_call_order_across_doubles");
        let (scope, failures) = collecting_scope();
        let a = scope.double("A");
        let b = scope.double("B");
        let foo: Member<(), (), Blocking> = a.method("foo", &[]);
        let bar: Member<(), (), Blocking> = b.method("bar", &[]);
        foo.when(()).then_return_unit();
        bar.when(()).then_return_unit();
        foo.call(());
        bar.call(());
        foo.call(());

        let mut order = scope.in_order(&[&a, &b]);
        let first = order.verify(&foo, (), times(1));
        let second = order.verify(&bar, (), times(1));
        let ok = first.is_ok() && second.is_ok();
        crate::assert_with_log!(ok, "foo then bar", true, (&first, &second));
        let cursor = order.cursor();
        crate::assert_with_log!(cursor == 2, "cursor past bar", 2, cursor);

        let mut reversed = scope.in_order(&[&a, &b]);
        let bar_first = reversed.verify(&bar, (), times(1));
        let foo_after = reversed.verify(&foo, (), times(1));
        crate::assert_with_log!(bar_first.is_ok(), "bar found", true, bar_first);
        // the second foo call comes after bar, so this one passes too
        crate::assert_with_log!(foo_after.is_ok(), "later foo", true, foo_after);
        let again = reversed.verify(&bar, (), times(1));
        crate::assert_with_log!(again.is_err(), "bar already passed", true, again);
        crate::assert_with_log!(failures.len() == 1, "one failure", 1, failures.len());
        crate::test_complete!("follows_real_call_order_across_doubles");
    }

    #[test]
    fn failed_verification_keeps_cursor() {
        init_test("failed_verification_keeps_cursor");
        let (scope, _failures) = collecting_scope();
        let a = scope.double("A");
        let put: Member<i32, (), Blocking> = a.method("put", &["value"]);
        put.when(any()).then_return_unit();
        put.call(1);
        put.call(2);

        let mut order = scope.in_order(&[&a]);
        let found = order.verify(&put, eq(1), times(1));
        crate::assert_with_log!(found.is_ok(), "first", true, found);
        let cursor = order.cursor();
        let missing = order.verify(&put, eq(5), at_least(1));
        crate::assert_with_log!(missing.is_err(), "missing", true, missing);
        let unchanged = order.cursor();
        crate::assert_with_log!(unchanged == cursor, "cursor kept", cursor, unchanged);
        let next = order.verify(&put, eq(2), times(1));
        crate::assert_with_log!(next.is_ok(), "second", true, next);
        crate::test_complete!("failed_verification_keeps_cursor");
    }

    #[test]
    fn zero_counts_pass_once_the_cursor_reaches_the_end() {
        init_test("zero_counts_pass_once_the_cursor_reaches_the_end");
        let (scope, failures) = collecting_scope();
        let a = scope.double("A");
        let put: Member<i32, (), Blocking> = a.method("put", &["value"]);
        put.when(any()).then_return_unit();

        let mut empty = scope.in_order(&[&a]);
        let nothing = empty.verify(&put, any(), never()).ok();
        crate::assert_with_log!(nothing == Some(0), "empty journal", Some(0), nothing);

        put.call(1);
        let mut order = scope.in_order(&[&a]);
        let counted = order.verify(&put, eq(1), times(1)).ok();
        crate::assert_with_log!(counted == Some(1), "last call", Some(1), counted);
        let cursor = order.cursor();
        crate::assert_with_log!(cursor == 1, "cursor at end", 1, cursor);

        let never_after = order.verify(&put, any(), never()).ok();
        crate::assert_with_log!(never_after == Some(0), "never", Some(0), never_after);
        let at_most_after = order.verify(&put, any(), at_most(0)).ok();
        crate::assert_with_log!(at_most_after == Some(0), "at most 0", Some(0), at_most_after);
        let once_after = order.verify(&put, any(), times(1));
        crate::assert_with_log!(once_after.is_err(), "once fails", true, once_after.is_err());
        crate::assert_with_log!(failures.len() == 1, "one report", 1, failures.len());
        crate::test_complete!("zero_counts_pass_once_the_cursor_reaches_the_end");
    }

    #[test]
    fn never_scans_to_the_end() {
        init_test("never_scans_to_the_end");
        let (scope, _failures) = collecting_scope();
        let a = scope.double("A");
        let put: Member<i32, (), Blocking> = a.method("put", &["value"]);
        put.when(any()).then_return_unit();
        put.call(1);
        put.call(3);

        let mut order = scope.in_order(&[&a]);
        let absent = order.verify(&put, eq(2), never()).ok();
        crate::assert_with_log!(absent == Some(0), "never 2", Some(0), absent);
        let present = order.verify(&put, eq(3), never());
        let observed = present.as_ref().err().and_then(crate::Error::observed);
        crate::assert_with_log!(observed == Some(1), "3 was called", Some(1), observed);
        let cursor = order.cursor();
        crate::assert_with_log!(cursor == 0, "cursor unmoved", 0, cursor);
        crate::test_complete!("never_scans_to_the_end");
    }

    #[test]
    #[should_panic(expected = "is not a participant")]
    fn non_participant_halts() {
        init_test("non_participant_halts");
        let scope = Scope::new();
        let a = scope.double("A");
        let b = scope.double("B");
        let bar: Member<(), (), Blocking> = b.method("bar", &[]);
        let mut order = scope.in_order(&[&a]);
        let _ = order.verify(&bar, (), times(1));
    }

    #[test]
    #[should_panic(expected = "created by another scope")]
    fn foreign_double_halts() {
        init_test("foreign_double_halts");
        let scope = Scope::new();
        let stranger = Scope::new().double("A");
        let _ = scope.in_order(&[&stranger]);
    }
}
