//! Per-member stub registry.
//!
//! Slots are kept in registration order. Resolution scans them newest
//! first, so a narrow stub written after a broad one overrides it for the
//! arguments it accepts and leaves the broad one in charge of the rest.
//! Resolution never looks at verification state.

use core::fmt;

use super::effect::Behavior;
use super::slot::InvocationSlot;
use crate::matcher::Matcher;
use crate::types::SlotHandle;

/// Outcome of a successful resolution.
pub struct Resolved<A, O> {
    /// The slot that accepted the arguments.
    pub slot: SlotHandle,
    /// Index of the evaluated behavior within the slot.
    pub position: usize,
    /// The behavior to evaluate.
    pub behavior: Behavior<A, O>,
}

impl<A, O> fmt::Debug for Resolved<A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("slot", &self.slot)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

/// The ordered slots of one member.
pub struct InvocationRegistry<A, O> {
    slots: Vec<InvocationSlot<A, O>>,
}

impl<A, O> Default for InvocationRegistry<A, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, O> InvocationRegistry<A, O> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Registers a new slot after every existing one.
    pub fn register(&mut self, matcher: Matcher<A>, initial: Behavior<A, O>) -> SlotHandle {
        let handle = SlotHandle::from_index(self.slots.len());
        self.slots.push(InvocationSlot::new(matcher, initial));
        handle
    }

    /// Appends a behavior to the slot behind `handle`.
    ///
    /// Returns false if `handle` was not issued by this registry.
    pub fn append_behavior(&mut self, handle: SlotHandle, behavior: Behavior<A, O>) -> bool {
        match self.slots.get_mut(handle.index()) {
            Some(slot) => {
                slot.append(behavior);
                true
            }
            None => false,
        }
    }

    /// Finds the newest slot accepting `args` and takes its next behavior.
    ///
    /// Returns `None` when no slot accepts the arguments.
    pub fn resolve(&mut self, args: &A) -> Option<Resolved<A, O>> {
        let index = self.slots.iter().rposition(|slot| slot.accepts(args))?;
        self.take(SlotHandle::from_index(index))
    }

    /// The slots' matchers in registration order.
    ///
    /// Lets a caller evaluate matchers without keeping the registry
    /// borrowed, then [`take`](Self::take) from the chosen slot.
    #[must_use]
    pub fn matchers(&self) -> Vec<Matcher<A>> {
        self.slots.iter().map(|slot| slot.matcher().clone()).collect()
    }

    /// Takes the next behavior of the slot behind `handle`, advancing it.
    pub fn take(&mut self, handle: SlotHandle) -> Option<Resolved<A, O>> {
        let slot = self.slots.get_mut(handle.index())?;
        let position = slot.current();
        let behavior = slot.advance();
        Some(Resolved {
            slot: handle,
            position,
            behavior,
        })
    }

    /// Returns the slot behind `handle`.
    #[must_use]
    pub fn slot(&self, handle: SlotHandle) -> Option<&InvocationSlot<A, O>> {
        self.slots.get(handle.index())
    }

    /// Number of registered slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<A, O> fmt::Debug for InvocationRegistry<A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.slots.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{any, eq, greater_than};
    use crate::test_utils::init_test_logging;
    use std::sync::Arc;

    fn init_test(name: &str) {
        init_test_logging();
        crate::test_phase!(name);
    }

    fn constant(value: i32) -> Behavior<i32, i32> {
        Arc::new(move |_| value)
    }

    fn eval(registry: &mut InvocationRegistry<i32, i32>, arg: i32) -> Option<i32> {
        registry.resolve(&arg).map(|resolved| (resolved.behavior)(&arg))
    }

    #[test]
    fn last_registered_match_wins_per_call() {
        init_test("last_registered_match_wins_per_call");
        let mut registry = InvocationRegistry::new();
        registry.register(any(), constant(7));
        registry.register(eq(3), constant(11));

        let narrow = eval(&mut registry, 3);
        crate::assert_with_log!(narrow == Some(11), "eq(3) overrides", Some(11), narrow);
        let broad = eval(&mut registry, 4);
        crate::assert_with_log!(broad == Some(7), "any handles the rest", Some(7), broad);
        crate::test_complete!("last_registered_match_wins_per_call");
    }

    #[test]
    fn broad_stub_registered_later_shadows_narrow() {
        init_test("broad_stub_registered_later_shadows_narrow");
        let mut registry = InvocationRegistry::new();
        registry.register(eq(3), constant(11));
        registry.register(any(), constant(7));
        let value = eval(&mut registry, 3);
        crate::assert_with_log!(value == Some(7), "newest wins", Some(7), value);
        crate::test_complete!("broad_stub_registered_later_shadows_narrow");
    }

    #[test]
    fn unmatched_and_empty_resolve_to_none() {
        init_test("unmatched_and_empty_resolve_to_none");
        let mut registry: InvocationRegistry<i32, i32> = InvocationRegistry::new();
        let empty = registry.resolve(&1).is_none();
        crate::assert_with_log!(empty, "empty registry", true, empty);

        registry.register(greater_than(10), constant(1));
        let rejected = registry.resolve(&1).is_none();
        crate::assert_with_log!(rejected, "all matchers reject", true, rejected);
        crate::test_complete!("unmatched_and_empty_resolve_to_none");
    }

    #[test]
    fn appended_behaviors_extend_the_same_slot() {
        init_test("appended_behaviors_extend_the_same_slot");
        let mut registry = InvocationRegistry::new();
        let handle = registry.register(any(), constant(0));
        let first = registry.append_behavior(handle, constant(1));
        let second = registry.append_behavior(handle, constant(2));
        let appended = first && second;
        crate::assert_with_log!(appended, "appended", true, appended);

        let outputs: Vec<Option<i32>> = (0..4).map(|_| eval(&mut registry, 5)).collect();
        let expected = vec![Some(0), Some(1), Some(2), Some(2)];
        crate::assert_with_log!(outputs == expected, "stacked", expected, outputs);
        let slots = registry.len();
        crate::assert_with_log!(slots == 1, "one slot", 1, slots);
        crate::test_complete!("appended_behaviors_extend_the_same_slot");
    }

    #[test]
    fn foreign_handle_is_rejected() {
        init_test("foreign_handle_is_rejected");
        let mut registry: InvocationRegistry<i32, i32> = InvocationRegistry::new();
        let appended = registry.append_behavior(SlotHandle::from_index(4), constant(1));
        crate::assert_with_log!(!appended, "unknown handle", false, appended);
        crate::test_complete!("foreign_handle_is_rejected");
    }

    #[test]
    fn matcher_snapshot_then_take_matches_resolve() {
        init_test("matcher_snapshot_then_take_matches_resolve");
        let mut registry = InvocationRegistry::new();
        registry.register(any(), constant(7));
        registry.register(eq(3), constant(11));

        let matchers = registry.matchers();
        let chosen = matchers.iter().rposition(|m| m.matches(&3));
        crate::assert_with_log!(chosen == Some(1), "newest accepting", Some(1), chosen);
        let value = registry
            .take(SlotHandle::from_index(1))
            .map(|resolved| (resolved.behavior)(&3));
        crate::assert_with_log!(value == Some(11), "taken", Some(11), value);
        let missing = registry.take(SlotHandle::from_index(2)).is_none();
        crate::assert_with_log!(missing, "unknown slot", true, missing);
        crate::test_complete!("matcher_snapshot_then_take_matches_resolve");
    }

    #[test]
    fn resolve_reports_position_within_slot() {
        init_test("resolve_reports_position_within_slot");
        let mut registry = InvocationRegistry::new();
        let handle = registry.register(any(), constant(0));
        registry.append_behavior(handle, constant(1));
        let positions: Vec<usize> = (0..3)
            .filter_map(|_| registry.resolve(&0).map(|r| r.position))
            .collect();
        crate::assert_with_log!(positions == vec![0, 1, 1], "positions", [0, 1, 1], positions);
        crate::test_complete!("resolve_reports_position_within_slot");
    }
}
