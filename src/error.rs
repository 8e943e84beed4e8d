//! Error types and error handling strategy for decoy.
//!
//! The engine distinguishes two classes of failure:
//!
//! - **Programmer errors** (fatal): a call no stub matches, an in-order
//!   verification against a double outside the session, a session built
//!   from doubles of another scope, a member declared twice. These mean the
//!   test itself is broken. They are reported, then the test is halted with
//!   a panic.
//! - **Assertion failures** (non-fatal): a verification's call count is not
//!   accepted by its [`Times`](crate::Times). They are reported and returned
//!   as `Err`; ledger and cursor state are left untouched so later
//!   assertions in the same test stay meaningful.
//!
//! Errors produced by stubbed behaviors are not engine errors: they are the
//! member's own `E` and flow to the caller as ordinary results.

use core::fmt;

use crate::types::{DoubleId, MemberId};

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // === Programmer errors ===
    /// No registered stub accepts the call's arguments.
    UnmatchedCall,
    /// In-order verification named a double that is not a session participant.
    NotInSession,
    /// An in-order session was built from a double of another scope.
    ForeignDouble,
    /// The same member identity was declared twice on one double.
    DuplicateMember,

    // === Assertion failures ===
    /// The observed call count did not satisfy the verification.
    CountMismatch,
}

impl ErrorKind {
    /// Returns the error category for this kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnmatchedCall
            | Self::NotInSession
            | Self::ForeignDouble
            | Self::DuplicateMember => ErrorCategory::Programmer,
            Self::CountMismatch => ErrorCategory::Assertion,
        }
    }

    /// Returns true if this kind halts the test.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.category(), ErrorCategory::Programmer)
    }
}

/// High-level error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The test is wired incorrectly; unrecoverable.
    Programmer,
    /// A verification predicate was not satisfied; recoverable.
    Assertion,
}

/// Diagnostic context for an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The double involved.
    pub double: Option<DoubleId>,
    /// The member involved.
    pub member: Option<MemberId>,
    /// The observed call count, for count mismatches.
    pub observed: Option<usize>,
}

/// The main error type for decoy operations.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    context: ErrorContext,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            context: ErrorContext {
                double: None,
                member: None,
                observed: None,
            },
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Returns true if this error halts the test.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Adds structured context to the error.
    #[must_use]
    pub fn with_context(mut self, ctx: ErrorContext) -> Self {
        self.context = ctx;
        self
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the error context.
    #[must_use]
    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    /// Returns the observed call count of a count mismatch.
    #[must_use]
    pub fn observed(&self) -> Option<usize> {
        self.context.observed
    }

    /// No stub of `member` accepts `arguments` (their `Debug` rendering).
    #[must_use]
    pub fn unmatched_call(owner: &str, double: DoubleId, member: &MemberId, arguments: &str) -> Self {
        Self::new(ErrorKind::UnmatchedCall)
            .with_message(format!(
                "{owner}.{member}: could not find a stub for arguments: {arguments}"
            ))
            .with_context(ErrorContext {
                double: Some(double),
                member: Some(member.clone()),
                observed: None,
            })
    }

    /// A verification of `member` observed `observed` matching calls.
    #[must_use]
    pub fn count_mismatch(
        owner: &str,
        double: DoubleId,
        member: &MemberId,
        matcher: &str,
        times: &str,
        observed: usize,
    ) -> Self {
        Self::new(ErrorKind::CountMismatch)
            .with_message(format!(
                "{owner}.{member}: incorrect calls count: {observed} \
                 (expected {times} matching {matcher})"
            ))
            .with_context(ErrorContext {
                double: Some(double),
                member: Some(member.clone()),
                observed: Some(observed),
            })
    }

    /// An in-order verification of `member` observed `observed` matching
    /// calls after journal position `cursor`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn order_mismatch(
        owner: &str,
        double: DoubleId,
        member: &MemberId,
        matcher: &str,
        times: &str,
        observed: usize,
        cursor: usize,
    ) -> Self {
        Self::new(ErrorKind::CountMismatch)
            .with_message(format!(
                "{owner}.{member}: incorrect calls count in order: {observed} after #{cursor} \
                 (expected {times} matching {matcher})"
            ))
            .with_context(ErrorContext {
                double: Some(double),
                member: Some(member.clone()),
                observed: Some(observed),
            })
    }

    /// `double` was named in an in-order verification it does not take part in.
    #[must_use]
    pub fn not_in_session(owner: &str, double: DoubleId, member: &MemberId) -> Self {
        Self::new(ErrorKind::NotInSession)
            .with_message(format!(
                "{owner}.{member}: double {double} is not a participant of this in-order session"
            ))
            .with_context(ErrorContext {
                double: Some(double),
                member: Some(member.clone()),
                observed: None,
            })
    }

    /// `double` belongs to another scope than the session being built.
    #[must_use]
    pub fn foreign_double(owner: &str, double: DoubleId) -> Self {
        Self::new(ErrorKind::ForeignDouble)
            .with_message(format!(
                "{owner} ({double}) was created by another scope and cannot join this in-order session"
            ))
            .with_context(ErrorContext {
                double: Some(double),
                member: None,
                observed: None,
            })
    }

    /// `member` was declared a second time on `double`.
    #[must_use]
    pub fn duplicate_member(owner: &str, double: DoubleId, member: &MemberId) -> Self {
        Self::new(ErrorKind::DuplicateMember)
            .with_message(format!("{owner}.{member}: member declared twice"))
            .with_context(ErrorContext {
                double: Some(double),
                member: Some(member.clone()),
                observed: None,
            })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// A specialized Result type for decoy operations.
pub type Result<T> = core::result::Result<T, Error>;
