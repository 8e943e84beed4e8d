//! Decoy: test doubles with argument-matched stubs, call recording and
//! quantified, claim-marking and in-order verification.
//!
//! # Overview
//!
//! A test creates a [`Scope`], creates [`Double`]s in it, and declares one
//! typed [`Member`] per member of the contract being replaced (normally the
//! job of generated code). Each member then supports three things:
//!
//! - **Stubbing**: `member.when(matcher).then_return(value)` registers a
//!   behavior for calls whose arguments the matcher accepts. The most
//!   recently registered matching stub wins; stacked behaviors are handed
//!   out in order and the last one repeats.
//! - **Calling**: `member.call(args)` records the call and evaluates the
//!   stub. A call no stub accepts halts the test.
//! - **Verification**: `member.verify(matcher, times)` counts unclaimed
//!   matching calls and claims them when the count is accepted, so each
//!   call satisfies at most one verification. [`OrderSession`] verifies
//!   relative order across doubles with one forward-only cursor.
//!
//! # Example
//!
//! ```
//! use decoy::{any, eq, greater_than, times, Blocking, Member, Scope};
//!
//! let scope = Scope::new();
//! let calculator = scope.double("Calculator");
//! let double: Member<i32, i32, Blocking> = calculator.method("double", &["x"]);
//!
//! double.when(any()).then_return(7);
//! double.when(eq(3)).then_return(11);
//!
//! assert_eq!(double.call(3), 11);
//! assert_eq!(double.call(4), 7);
//! assert_eq!(double.verify(greater_than(0), times(2)).unwrap(), 2);
//! ```
//!
//! # Effect kinds
//!
//! A member's effect kind is a type parameter: [`Blocking`], [`Fallible`],
//! [`Async`], [`AsyncFallible`], [`Rethrows`] and [`AsyncRethrows`]. All six
//! share one resolution algorithm and differ only in what a behavior
//! produces and how the caller receives it.
//!
//! # Module Structure
//!
//! - [`types`]: identifiers and member identities
//! - [`matcher`]: argument and times matchers
//! - [`stub`]: effect kinds, slots, registries and the stub builder
//! - [`record`]: call logs, the claim ledger and the scope journal
//! - [`order`]: in-order verification sessions
//! - [`double`]: scopes, doubles and members
//! - [`report`]: the injectable failure reporter
//! - [`config`]: configuration loading
//! - [`error`]: error types
//! - [`tracing_compat`]: structured logging facade

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod double;
pub mod error;
pub mod matcher;
pub mod order;
pub mod record;
pub mod report;
pub mod stub;
pub mod tracing_compat;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use config::{ConfigError, ConfigLoader, FailureMode, MockConfig};
pub use double::{CallSummary, Double, Member, Scope};
pub use error::{Error, ErrorCategory, ErrorKind, Result};
pub use matcher::{
    any, at_least, at_least_once, at_most, eq, greater_than, is_none, is_some, less_than,
    matching, never, times, zip, IntoMatcher, Matcher, Times,
};
pub use order::OrderSession;
pub use report::{FailureLog, Reporter};
pub use stub::{
    Async, AsyncFallible, AsyncRethrows, Behavior, Blocking, Effect, Fallible, FallibleEffect,
    Rethrows, Stub,
};
pub use types::{CallSeq, DoubleId, EffectKind, MemberId, MemberRole, SlotHandle};
