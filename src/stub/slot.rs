//! One registered stub.

use core::fmt;

use super::effect::Behavior;
use crate::matcher::Matcher;

/// A matcher plus a non-empty, ordered list of behaviors.
///
/// Each evaluation hands out `behaviors[current]` and then advances
/// `current`, pinning on the last behavior: a slot with `[b0, b1]` yields
/// `b0, b1, b1, b1, ...`.
pub struct InvocationSlot<A, O> {
    matcher: Matcher<A>,
    behaviors: Vec<Behavior<A, O>>,
    current: usize,
}

impl<A, O> InvocationSlot<A, O> {
    /// Creates a slot holding its first behavior.
    #[must_use]
    pub fn new(matcher: Matcher<A>, initial: Behavior<A, O>) -> Self {
        Self {
            matcher,
            behaviors: vec![initial],
            current: 0,
        }
    }

    /// Appends a behavior after the existing ones.
    pub fn append(&mut self, behavior: Behavior<A, O>) {
        self.behaviors.push(behavior);
    }

    /// Returns true if the slot's matcher accepts `args`.
    #[must_use]
    pub fn accepts(&self, args: &A) -> bool {
        self.matcher.matches(args)
    }

    /// Takes the behavior for this evaluation and advances the cursor.
    pub fn advance(&mut self) -> Behavior<A, O> {
        let behavior = self.behaviors[self.current].clone();
        if self.current + 1 < self.behaviors.len() {
            self.current += 1;
        }
        behavior
    }

    /// Index of the behavior the next evaluation uses.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Number of behaviors in the slot. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    /// Always false; a slot is created with one behavior.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// The slot's matcher.
    #[must_use]
    pub fn matcher(&self) -> &Matcher<A> {
        &self.matcher
    }
}

impl<A, O> fmt::Debug for InvocationSlot<A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationSlot")
            .field("matcher", &self.matcher.description())
            .field("behaviors", &self.behaviors.len())
            .field("current", &self.current)
            .finish()
    }
}
