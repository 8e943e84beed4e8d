//! Argument matchers.
//!
//! A [`Matcher<T>`] is a predicate over one argument value. Matchers decide
//! whether a stub applies to a call and whether a recorded call counts
//! toward a verification. They compose with [`Matcher::and`] /
//! [`Matcher::or`] (also `&` and `|`), and positionally into a matcher over
//! a member's whole argument tuple through [`IntoMatcher`].
//!
//! Matching is never structural equality of the argument tuple: every
//! position is tested by its own matcher.
//!
//! ```
//! use decoy::matcher::{any, eq, greater_than, less_than, IntoMatcher};
//!
//! let in_range = greater_than(0) & less_than(10);
//! assert!(in_range.matches(&5));
//! assert!(!in_range.matches(&10));
//!
//! let pair = (eq("alice"), any::<u32>()).into_matcher();
//! assert!(pair.matches(&("alice", 42)));
//! assert_eq!(pair.description(), "(eq(\"alice\"), any)");
//! ```

pub mod times;

pub use times::{at_least, at_least_once, at_most, never, times, Times};

use core::fmt;
use std::ops::{BitAnd, BitOr};
use std::sync::Arc;

/// A predicate over one argument value, with a human-readable description.
pub struct Matcher<T> {
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
    description: Arc<str>,
}

impl<T> Clone for Matcher<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
            description: Arc::clone(&self.description),
        }
    }
}

impl<T> Matcher<T> {
    /// Creates a matcher from a predicate and the description shown in
    /// failure messages.
    ///
    /// The predicate runs on the calling thread while that thread holds the
    /// scope's journal and member locks. Both are reentrant, so it may read
    /// the scope (`call_count`, `history`, another member's `calls`) or
    /// even call a double. It must not wait on another thread that uses
    /// the same scope: that thread blocks on the locks the predicate holds.
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            description: Arc::from(description.into()),
        }
    }

    /// Tests a value.
    #[inline]
    #[must_use]
    pub fn matches(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    /// Description used in diagnostics.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Matches when both matchers accept. `other` is not evaluated when
    /// `self` rejects.
    #[must_use]
    pub fn and(self, other: Self) -> Self
    where
        T: 'static,
    {
        let description = format!("({} && {})", self.description, other.description);
        Self::new(description, move |value| {
            self.matches(value) && other.matches(value)
        })
    }

    /// Matches when either matcher accepts. `other` is not evaluated when
    /// `self` accepts.
    #[must_use]
    pub fn or(self, other: Self) -> Self
    where
        T: 'static,
    {
        let description = format!("({} || {})", self.description, other.description);
        Self::new(description, move |value| {
            self.matches(value) || other.matches(value)
        })
    }
}

impl<T: 'static> BitAnd for Matcher<T> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl<T: 'static> BitOr for Matcher<T> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl<T> fmt::Debug for Matcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Matcher").field(&self.description).finish()
    }
}

impl<T> fmt::Display for Matcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Accepts every value.
#[must_use]
pub fn any<T: 'static>() -> Matcher<T> {
    Matcher::new("any", |_| true)
}

/// Accepts values equal to `expected`.
#[must_use]
pub fn eq<T>(expected: T) -> Matcher<T>
where
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
{
    let description = format!("eq({expected:?})");
    Matcher::new(description, move |value| *value == expected)
}

/// Accepts `None`.
#[must_use]
pub fn is_none<T: 'static>() -> Matcher<Option<T>> {
    Matcher::new("is_none", Option::is_none)
}

/// Accepts any `Some`.
#[must_use]
pub fn is_some<T: 'static>() -> Matcher<Option<T>> {
    Matcher::new("is_some", Option::is_some)
}

/// Accepts values strictly less than `bound`.
#[must_use]
pub fn less_than<T>(bound: T) -> Matcher<T>
where
    T: PartialOrd + fmt::Debug + Send + Sync + 'static,
{
    let description = format!("lt({bound:?})");
    Matcher::new(description, move |value| *value < bound)
}

/// Accepts values strictly greater than `bound`.
#[must_use]
pub fn greater_than<T>(bound: T) -> Matcher<T>
where
    T: PartialOrd + fmt::Debug + Send + Sync + 'static,
{
    let description = format!("gt({bound:?})");
    Matcher::new(description, move |value| *value > bound)
}

/// Accepts values satisfying an arbitrary predicate.
///
/// Same locking rules as [`Matcher::new`]: the predicate may read the
/// scope but must not block on other threads using it.
#[must_use]
pub fn matching<T: 'static, F>(predicate: F) -> Matcher<T>
where
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    Matcher::new("matching(..)", predicate)
}

/// Combines two matchers into a matcher over a pair.
#[must_use]
pub fn zip<T0: 'static, T1: 'static>(first: Matcher<T0>, second: Matcher<T1>) -> Matcher<(T0, T1)> {
    (first, second).into_matcher()
}

/// Conversion into a matcher over a member's full argument tuple.
///
/// Implemented for a single `Matcher<A>` (one-parameter members and
/// whole-tuple predicates), for `()` (zero-parameter members, always
/// matches), and for tuples of matchers, which test each position in
/// order and stop at the first rejection.
pub trait IntoMatcher<A> {
    /// Performs the conversion.
    fn into_matcher(self) -> Matcher<A>;
}

impl<A> IntoMatcher<A> for Matcher<A> {
    fn into_matcher(self) -> Matcher<A> {
        self
    }
}

impl IntoMatcher<()> for () {
    fn into_matcher(self) -> Matcher<()> {
        Matcher::new("()", |()| true)
    }
}

macro_rules! positional_matcher {
    ($($ty:ident $var:ident $idx:tt),+) => {
        impl<$($ty: 'static),+> IntoMatcher<($($ty,)+)> for ($(Matcher<$ty>,)+) {
            fn into_matcher(self) -> Matcher<($($ty,)+)> {
                let ($($var,)+) = self;
                let description = format!(
                    "({})",
                    [$($var.description()),+].join(", ")
                );
                Matcher::new(description, move |args: &($($ty,)+)| {
                    true $(&& $var.matches(&args.$idx))+
                })
            }
        }
    };
}

positional_matcher!(T0 m0 0);
positional_matcher!(T0 m0 0, T1 m1 1);
positional_matcher!(T0 m0 0, T1 m1 1, T2 m2 2);
positional_matcher!(T0 m0 0, T1 m1 1, T2 m2 2, T3 m3 3);
positional_matcher!(T0 m0 0, T1 m1 1, T2 m2 2, T3 m3 3, T4 m4 4);
positional_matcher!(T0 m0 0, T1 m1 1, T2 m2 2, T3 m3 3, T4 m4 4, T5 m5 5);
positional_matcher!(T0 m0 0, T1 m1 1, T2 m2 2, T3 m3 3, T4 m4 4, T5 m5 5, T6 m6 6);
positional_matcher!(T0 m0 0, T1 m1 1, T2 m2 2, T3 m3 3, T4 m4 4, T5 m5 5, T6 m6 6, T7 m7 7);
