//! Identifier types for the engine's entities.
//!
//! These types give type-safe names to doubles, recorded calls and stub
//! slots. None of them carry behavior; they exist so that a `usize` meaning
//! "journal position" can never be confused with one meaning "slot index".

use core::fmt;

/// Identifies one test double within its [`Scope`](crate::Scope).
///
/// Ids are issued by the scope in creation order, so the first double of a
/// test is always `D1`, independent of what other tests run concurrently.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DoubleId(u32);

impl DoubleId {
    /// Creates a double ID from its scope-local index (internal use).
    #[must_use]
    pub(crate) const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// Creates a double ID for testing/benchmarking purposes.
    #[doc(hidden)]
    #[must_use]
    pub const fn new_for_test(index: u32) -> Self {
        Self(index)
    }

    /// Returns the scope-local index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for DoubleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DoubleId({})", self.0)
    }
}

impl fmt::Display for DoubleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// Position of a recorded call in its scope's journal.
///
/// Sequence numbers are dense and strictly increasing in real call order
/// across every double of a scope. They are the total order used by both
/// per-double and in-order verification.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallSeq(usize);

impl CallSeq {
    /// Creates a sequence number from a journal position (internal use).
    #[must_use]
    pub(crate) const fn from_position(position: usize) -> Self {
        Self(position)
    }

    /// Creates a sequence number for testing/benchmarking purposes.
    #[doc(hidden)]
    #[must_use]
    pub const fn new_for_test(position: usize) -> Self {
        Self(position)
    }

    /// Returns the journal position.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Debug for CallSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallSeq({})", self.0)
    }
}

impl fmt::Display for CallSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a registered stub slot, used to append further behaviors.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SlotHandle(usize);

impl SlotHandle {
    #[must_use]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Returns the slot's registration index within its registry.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}
