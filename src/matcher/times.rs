//! Call-count matchers.
//!
//! A [`Times`] is a predicate over the number of recorded calls that
//! satisfied a verification's argument matcher. The default is
//! [`times(1)`](times).

use core::fmt;
use std::ops::{BitAnd, BitOr};
use std::sync::Arc;

/// A predicate over a call count, with a human-readable description.
#[derive(Clone)]
pub struct Times {
    predicate: Arc<dyn Fn(usize) -> bool + Send + Sync>,
    description: Arc<str>,
}

impl Times {
    /// Creates a count matcher from a predicate and its description.
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(usize) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            description: Arc::from(description.into()),
        }
    }

    /// Tests a call count.
    #[inline]
    #[must_use]
    pub fn matches(&self, count: usize) -> bool {
        (self.predicate)(count)
    }

    /// Description used in diagnostics.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Both predicates must hold; `other` is skipped when `self` fails.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let description = format!("({} and {})", self.description, other.description);
        Self::new(description, move |count| {
            self.matches(count) && other.matches(count)
        })
    }

    /// Either predicate must hold; `other` is skipped when `self` holds.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let description = format!("({} or {})", self.description, other.description);
        Self::new(description, move |count| {
            self.matches(count) || other.matches(count)
        })
    }
}

impl Default for Times {
    fn default() -> Self {
        times(1)
    }
}

impl BitAnd for Times {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl BitOr for Times {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl fmt::Debug for Times {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Times").field(&self.description).finish()
    }
}

impl fmt::Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Exactly `n` calls.
#[must_use]
pub fn times(n: usize) -> Times {
    Times::new(format!("exactly {n}"), move |count| count == n)
}

/// At least `n` calls.
#[must_use]
pub fn at_least(n: usize) -> Times {
    Times::new(format!("at least {n}"), move |count| count >= n)
}

/// At least one call.
#[must_use]
pub fn at_least_once() -> Times {
    at_least(1)
}

/// At most `n` calls.
#[must_use]
pub fn at_most(n: usize) -> Times {
    Times::new(format!("at most {n}"), move |count| count <= n)
}

/// No calls.
#[must_use]
pub fn never() -> Times {
    Times::new("never", |count| count == 0)
}
