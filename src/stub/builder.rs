//! The `when(...).then_*(...)` stub expression.
//!
//! The first `then_*` registers a new slot; every later `then_*` on the
//! same expression appends to that slot, so
//! `member.when(any()).then_return(1).then_return(2)` answers `1, 2, 2, ...`.

use core::fmt;
use core::future::Future;
use std::sync::Arc;

use futures_lite::future::Boxed;

use super::effect::{
    Async, AsyncFallible, AsyncRethrows, Behavior, Blocking, Effect, Fallible, FallibleEffect,
    Rethrows,
};
use crate::double::Member;
use crate::matcher::Matcher;
use crate::types::SlotHandle;

/// A stub expression under construction.
pub struct Stub<'m, A, R, K: Effect<R>> {
    member: &'m Member<A, R, K>,
    matcher: Option<Matcher<A>>,
    handle: Option<SlotHandle>,
}

impl<'m, A, R, K> Stub<'m, A, R, K>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    K: Effect<R>,
{
    pub(crate) fn new(member: &'m Member<A, R, K>, matcher: Matcher<A>) -> Self {
        Self {
            member,
            matcher: Some(matcher),
            handle: None,
        }
    }

    /// Adds an arbitrary behavior to the expression.
    #[allow(clippy::return_self_not_must_use)]
    pub fn then(mut self, behavior: Behavior<A, K::Output>) -> Self {
        match (self.handle, self.matcher.take()) {
            (Some(handle), _) => self.member.append_behavior(handle, behavior),
            (None, Some(matcher)) => self.handle = Some(self.member.register(matcher, behavior)),
            (None, None) => {}
        }
        self
    }

    /// Answers every matching call with a clone of `value`.
    #[allow(clippy::return_self_not_must_use)]
    pub fn then_return(self, value: R) -> Self
    where
        R: Clone + Send + Sync + 'static,
    {
        self.then(Arc::new(move |_: &A| K::ready(value.clone())))
    }

    /// The slot this expression registered, once a behavior was added.
    #[must_use]
    pub fn handle(&self) -> Option<SlotHandle> {
        self.handle
    }
}

impl<'m, A, K> Stub<'m, A, (), K>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    K: Effect<()>,
{
    /// Completes a unit-returning member normally.
    #[allow(clippy::return_self_not_must_use)]
    pub fn then_return_unit(self) -> Self {
        self.then(Arc::new(|_: &A| K::ready(())))
    }
}

impl<'m, A, R, K> Stub<'m, A, R, K>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    K: FallibleEffect<R>,
{
    /// Fails every matching call with a clone of `error`.
    #[allow(clippy::return_self_not_must_use)]
    pub fn then_throw(self, error: K::Error) -> Self
    where
        K::Error: Clone + Send + Sync,
    {
        self.then(Arc::new(move |_: &A| K::fail(error.clone())))
    }
}

impl<'m, A, R> Stub<'m, A, R, Blocking>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    R: 'static,
{
    /// Computes the result from the call's arguments.
    #[allow(clippy::return_self_not_must_use)]
    pub fn then_answer<F>(self, answer: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        self.then(Arc::new(answer))
    }
}

impl<'m, A, R> Stub<'m, A, R, Async>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    R: Send + 'static,
{
    /// Computes a future of the result from the call's arguments. The future
    /// is awaited by the caller.
    #[allow(clippy::return_self_not_must_use)]
    pub fn then_answer<F, Fut>(self, answer: F) -> Self
    where
        F: Fn(&A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        self.then(Arc::new(move |args: &A| -> Boxed<R> { Box::pin(answer(args)) }))
    }
}

macro_rules! sync_fallible_answer {
    ($marker:ident) => {
        impl<'m, A, R, E> Stub<'m, A, R, $marker<E>>
        where
            A: Clone + fmt::Debug + Send + Sync + 'static,
            R: 'static,
            E: 'static,
        {
            /// Computes the result, or the error, from the call's arguments.
            #[allow(clippy::return_self_not_must_use)]
            pub fn then_answer<F>(self, answer: F) -> Self
            where
                F: Fn(&A) -> Result<R, E> + Send + Sync + 'static,
            {
                self.then(Arc::new(answer))
            }
        }
    };
}

macro_rules! async_fallible_answer {
    ($marker:ident) => {
        impl<'m, A, R, E> Stub<'m, A, R, $marker<E>>
        where
            A: Clone + fmt::Debug + Send + Sync + 'static,
            R: Send + 'static,
            E: Send + 'static,
        {
            /// Computes a future of the result, or the error, from the
            /// call's arguments.
            #[allow(clippy::return_self_not_must_use)]
            pub fn then_answer<F, Fut>(self, answer: F) -> Self
            where
                F: Fn(&A) -> Fut + Send + Sync + 'static,
                Fut: Future<Output = Result<R, E>> + Send + 'static,
            {
                self.then(Arc::new(move |args: &A| -> Boxed<Result<R, E>> {
                    Box::pin(answer(args))
                }))
            }
        }
    };
}

sync_fallible_answer!(Fallible);
sync_fallible_answer!(Rethrows);
async_fallible_answer!(AsyncFallible);
async_fallible_answer!(AsyncRethrows);

impl<A, R, K: Effect<R>> fmt::Debug for Stub<'_, A, R, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stub")
            .field("member", self.member.id())
            .field("handle", &self.handle)
            .finish()
    }
}
