//! Effect kinds as a closed set of marker types.
//!
//! A member's effect kind decides only the *shape* of what a behavior
//! produces: a bare value, a `Result`, or a boxed future of either. The
//! slot/registry algorithm is shared by all six kinds; it stores
//! [`Behavior<A, K::Output>`](Behavior) and never looks inside the output.
//!
//! | Marker | [`EffectKind`] | `Output` |
//! |--------|----------------|----------|
//! | [`Blocking`] | `Sync` | `R` |
//! | [`Fallible<E>`] | `Fallible` | `Result<R, E>` |
//! | [`Async`] | `Async` | `Boxed<R>` |
//! | [`AsyncFallible<E>`] | `AsyncFallible` | `Boxed<Result<R, E>>` |
//! | [`Rethrows<E>`] | `ConditionalFallible` | `Result<R, E>` |
//! | [`AsyncRethrows<E>`] | `AsyncConditionalFallible` | `Boxed<Result<R, E>>` |
//!
//! The conditional kinds differ from their fallible twins at the call site
//! only: the caller passes a continuation that decides what a stubbed error
//! becomes.

use core::marker::PhantomData;
use std::sync::Arc;

use futures_lite::future::{self, Boxed};

use crate::types::EffectKind;

/// One stubbed outcome: computes the member's output from the call's
/// arguments.
pub type Behavior<A, O> = Arc<dyn Fn(&A) -> O + Send + Sync>;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Blocking {}
    impl<E> Sealed for super::Fallible<E> {}
    impl Sealed for super::Async {}
    impl<E> Sealed for super::AsyncFallible<E> {}
    impl<E> Sealed for super::Rethrows<E> {}
    impl<E> Sealed for super::AsyncRethrows<E> {}
}

/// An effect kind for a member returning `R`.
///
/// Sealed: the six markers in this module are the only implementations.
pub trait Effect<R>: sealed::Sealed + 'static {
    /// Runtime tag, used in member identities and diagnostics.
    const KIND: EffectKind;

    /// What one evaluation of a behavior produces.
    type Output: 'static;

    /// Lifts a plain value into a successful output.
    fn ready(value: R) -> Self::Output;
}

/// An effect kind whose behaviors may produce the member's error `E`.
pub trait FallibleEffect<R>: Effect<R> {
    /// The member's declared error type.
    type Error: 'static;

    /// Lifts an error into a failed output.
    fn fail(error: Self::Error) -> Self::Output;
}

/// Plain synchronous member.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blocking;

/// Synchronous member returning `Result<R, E>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fallible<E>(PhantomData<fn() -> E>);

/// Asynchronous member.
#[derive(Debug, Clone, Copy, Default)]
pub struct Async;

/// Asynchronous member resolving to `Result<R, E>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncFallible<E>(PhantomData<fn() -> E>);

/// Synchronous member whose errors are routed through a caller-supplied
/// continuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rethrows<E>(PhantomData<fn() -> E>);

/// Asynchronous member whose errors are routed through a caller-supplied
/// continuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncRethrows<E>(PhantomData<fn() -> E>);

impl<R: 'static> Effect<R> for Blocking {
    const KIND: EffectKind = EffectKind::Sync;
    type Output = R;

    fn ready(value: R) -> R {
        value
    }
}

impl<R: Send + 'static> Effect<R> for Async {
    const KIND: EffectKind = EffectKind::Async;
    type Output = Boxed<R>;

    fn ready(value: R) -> Boxed<R> {
        Box::pin(future::ready(value))
    }
}

macro_rules! fallible_effect {
    ($marker:ident, $kind:ident) => {
        impl<R: 'static, E: 'static> Effect<R> for $marker<E> {
            const KIND: EffectKind = EffectKind::$kind;
            type Output = Result<R, E>;

            fn ready(value: R) -> Self::Output {
                Ok(value)
            }
        }

        impl<R: 'static, E: 'static> FallibleEffect<R> for $marker<E> {
            type Error = E;

            fn fail(error: E) -> Self::Output {
                Err(error)
            }
        }
    };
}

macro_rules! async_fallible_effect {
    ($marker:ident, $kind:ident) => {
        impl<R: Send + 'static, E: Send + 'static> Effect<R> for $marker<E> {
            const KIND: EffectKind = EffectKind::$kind;
            type Output = Boxed<Result<R, E>>;

            fn ready(value: R) -> Self::Output {
                Box::pin(future::ready(Ok(value)))
            }
        }

        impl<R: Send + 'static, E: Send + 'static> FallibleEffect<R> for $marker<E> {
            type Error = E;

            fn fail(error: E) -> Self::Output {
                Box::pin(future::ready(Err(error)))
            }
        }
    };
}

fallible_effect!(Fallible, Fallible);
fallible_effect!(Rethrows, ConditionalFallible);
async_fallible_effect!(AsyncFallible, AsyncFallible);
async_fallible_effect!(AsyncRethrows, AsyncConditionalFallible);
