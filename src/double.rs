//! Scopes, doubles and members: the surface generated doubles are built on.
//!
//! A [`Scope`] is the object graph of one test. It owns the cross-double
//! [`Journal`], the [`Reporter`] and the [`MockConfig`]; dropping the last
//! handle to it discards every log, stub and session of the test.
//!
//! A [`Double`] stands in for one implementation of a contract. For each
//! member of the contract, the generated code declares a typed [`Member`]
//! once and routes through it:
//!
//! ```rust,ignore
//! struct AccountMock {
//!     double: Double,
//!     transfer: Member<(String, String, u64), bool, Blocking>,
//! }
//!
//! impl AccountMock {
//!     fn new(scope: &Scope) -> Self {
//!         let double = scope.double("Account");
//!         let transfer = double.method("transfer", &["from", "to", "amount"]);
//!         Self { double, transfer }
//!     }
//! }
//!
//! impl Account for AccountMock {
//!     fn transfer(&self, from: &str, to: &str, amount: u64) -> bool {
//!         self.transfer.call((from.to_owned(), to.to_owned(), amount))
//!     }
//! }
//! ```
//!
//! # Locking
//!
//! A call takes the journal lock, then the member's lock; nothing takes
//! them in the other order. Both locks are reentrant and the state behind
//! them is only borrowed between user callbacks: matchers are evaluated
//! against a snapshot, and both locks are released before the stubbed
//! behavior runs.

use core::fmt;
use core::marker::PhantomData;
use core::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use futures_lite::future::Boxed;
use parking_lot::{Mutex, ReentrantMutex};

use crate::config::{ConfigError, ConfigLoader, MockConfig};
use crate::error::{Error, Result};
use crate::matcher::{IntoMatcher, Matcher, Times};
use crate::order::OrderSession;
use crate::record::{Journal, JournalEntry, LedgerStats, VerifyLedger};
use crate::report::Reporter;
use crate::stub::{
    Async, AsyncFallible, AsyncRethrows, Behavior, Blocking, Effect, Fallible,
    InvocationRegistry, Rethrows, Stub,
};
use crate::tracing_compat::{debug, error, trace, warn};
use crate::types::{CallSeq, DoubleId, MemberId, SlotHandle};

/// State shared by everything created from one scope.
pub(crate) struct ScopeShared {
    pub(crate) journal: Journal,
    reporter: Reporter,
    config: MockConfig,
    next_double: AtomicU32,
}

impl ScopeShared {
    fn new(config: MockConfig, reporter: Reporter) -> Self {
        Self {
            journal: Journal::new(),
            reporter,
            config,
            next_double: AtomicU32::new(1),
        }
    }

    /// The error text followed by the most recent calls of `double`.
    fn render(&self, error: &Error, double: Option<DoubleId>) -> String {
        let mut message = error.to_string();
        let limit = self.config.history_limit;
        let Some(double) = double else {
            return message;
        };
        if limit == 0 {
            return message;
        }
        let history = self.journal.entries_of(double);
        if history.is_empty() {
            message.push_str("\n  no calls recorded");
            return message;
        }
        let skip = history.len().saturating_sub(limit);
        let _ = write!(
            message,
            "\n  recent calls ({} of {}):",
            history.len() - skip,
            history.len()
        );
        for entry in &history[skip..] {
            let _ = write!(
                message,
                "\n    {} {} <- {}",
                entry.seq, entry.member, entry.arguments
            );
        }
        message
    }

    /// Reports a programmer error and halts the test.
    pub(crate) fn halt(&self, failure: Error, double: Option<DoubleId>) -> ! {
        let message = self.render(&failure, double);
        error!(kind = ?failure.kind(), double = ?double, "{message}");
        self.reporter.report(&message);
        panic!("{message}");
    }

    /// Reports an assertion failure and hands it back to the caller.
    pub(crate) fn fail<T>(&self, failure: Error, double: DoubleId) -> Result<T> {
        let message = self.render(&failure, Some(double));
        warn!(
            kind = ?failure.kind(),
            double = ?double,
            observed = failure.observed().unwrap_or_default(),
            "{message}"
        );
        self.reporter.report(&message);
        Err(failure)
    }
}

/// The object graph of one test.
///
/// Cloning a scope yields another handle to the same graph.
#[derive(Clone)]
pub struct Scope {
    shared: Arc<ScopeShared>,
}

impl Scope {
    /// Creates a scope with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(MockConfig::default())
    }

    /// Creates a scope whose reporter follows `config.failure_mode`.
    #[must_use]
    pub fn from_config(config: MockConfig) -> Self {
        let reporter = config.failure_mode.reporter();
        Self::with_config_and_reporter(config, reporter)
    }

    /// Creates a scope with the default configuration and a custom reporter.
    #[must_use]
    pub fn with_reporter(reporter: Reporter) -> Self {
        Self::with_config_and_reporter(MockConfig::default(), reporter)
    }

    /// Creates a scope with both a configuration and a custom reporter; the
    /// reporter wins over `config.failure_mode`.
    #[must_use]
    pub fn with_config_and_reporter(config: MockConfig, reporter: Reporter) -> Self {
        Self {
            shared: Arc::new(ScopeShared::new(config, reporter)),
        }
    }

    /// Creates a scope configured from `DECOY_*` environment variables.
    pub fn from_env() -> core::result::Result<Self, ConfigError> {
        ConfigLoader::new().load().map(Self::from_config)
    }

    /// Creates a double named after the contract it stands in for.
    #[must_use]
    pub fn double(&self, type_name: &str) -> Double {
        let index = self.shared.next_double.fetch_add(1, Ordering::Relaxed);
        let id = DoubleId::from_index(index);
        debug!(double = ?id, type_name = %type_name, "double created");
        Double {
            shared: Arc::clone(&self.shared),
            id,
            name: Arc::from(type_name),
            declared: Mutex::new(BTreeSet::new()),
        }
    }

    /// Starts an in-order verification session over `doubles`.
    ///
    /// # Panics
    ///
    /// Halts the test if a double was created by another scope.
    #[must_use]
    pub fn in_order(&self, doubles: &[&Double]) -> OrderSession {
        for double in doubles {
            if !Arc::ptr_eq(&double.shared, &self.shared) {
                self.shared
                    .halt(Error::foreign_double(&double.name, double.id), None);
            }
        }
        let participants = doubles
            .iter()
            .map(|double| (double.id, Arc::clone(&double.name)))
            .collect();
        OrderSession::new(Arc::clone(&self.shared), participants)
    }

    /// The scope's configuration.
    #[must_use]
    pub fn config(&self) -> &MockConfig {
        &self.shared.config
    }

    /// Every call made on any double of the scope, oldest first.
    #[must_use]
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.shared.journal.with_entries(<[JournalEntry]>::to_vec)
    }

    /// Number of calls made on any double of the scope.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.shared.journal.len()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("config", &self.shared.config)
            .field("calls", &self.shared.journal.len())
            .finish()
    }
}

/// One call of a double, as listed by [`Double::history`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSummary {
    /// Position in the scope journal.
    pub seq: CallSeq,
    /// The member called.
    pub member: MemberId,
    /// `Debug` rendering of the arguments.
    pub arguments: String,
}

impl From<JournalEntry> for CallSummary {
    fn from(entry: JournalEntry) -> Self {
        Self {
            seq: entry.seq,
            member: entry.member,
            arguments: entry.arguments,
        }
    }
}

impl fmt::Display for CallSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}", self.member, self.arguments)
    }
}

/// A test double: a named owner of typed members.
pub struct Double {
    shared: Arc<ScopeShared>,
    id: DoubleId,
    name: Arc<str>,
    declared: Mutex<BTreeSet<MemberId>>,
}

impl Double {
    /// Creates a double in a private scope of its own.
    #[must_use]
    pub fn standalone(type_name: &str) -> Self {
        Scope::new().double(type_name)
    }

    /// The double's scope-local id.
    #[must_use]
    pub fn id(&self) -> DoubleId {
        self.id
    }

    /// The contract name the double stands in for.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A handle to the scope the double belongs to.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Every call made on this double, oldest first, across members.
    #[must_use]
    pub fn history(&self) -> Vec<CallSummary> {
        self.shared
            .journal
            .entries_of(self.id)
            .into_iter()
            .map(CallSummary::from)
            .collect()
    }

    /// Declares a method.
    ///
    /// # Panics
    ///
    /// Halts the test if the same member was declared before.
    #[must_use]
    pub fn method<A, R, K: Effect<R>>(&self, name: &str, params: &[&str]) -> Member<A, R, K> {
        self.declare(MemberId::method(name, params, K::KIND))
    }

    /// Declares a property getter, `property.get`.
    #[must_use]
    pub fn getter<R, K: Effect<R>>(&self, property: &str) -> Member<(), R, K> {
        self.declare(MemberId::getter(property, K::KIND))
    }

    /// Declares a property setter, `property.set`, taking the new value.
    #[must_use]
    pub fn setter<V>(&self, property: &str) -> Member<V, (), Blocking> {
        self.declare(MemberId::setter(property))
    }

    /// Declares an indexer getter.
    #[must_use]
    pub fn subscript_getter<A, R, K: Effect<R>>(&self, params: &[&str]) -> Member<A, R, K> {
        self.declare(MemberId::subscript_getter(params, K::KIND))
    }

    /// Declares an indexer setter; `A` ends with the new value.
    #[must_use]
    pub fn subscript_setter<A>(&self, params: &[&str]) -> Member<A, (), Blocking> {
        self.declare(MemberId::subscript_setter(params))
    }

    fn declare<A, R, K: Effect<R>>(&self, id: MemberId) -> Member<A, R, K> {
        let inserted = self.declared.lock().insert(id.clone());
        if !inserted {
            self.shared
                .halt(Error::duplicate_member(&self.name, self.id, &id), Some(self.id));
        }
        trace!(double = ?self.id, member = %id, effect = %id.effect(), "member declared");
        Member {
            shared: Arc::clone(&self.shared),
            double: self.id,
            owner: Arc::clone(&self.name),
            id,
            state: ReentrantMutex::new(RefCell::new(MemberState {
                registry: InvocationRegistry::new(),
                ledger: VerifyLedger::new(),
            })),
            _result: PhantomData,
        }
    }
}

impl fmt::Debug for Double {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Double")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("members", &self.declared.lock().len())
            .finish()
    }
}

struct MemberState<A, O> {
    registry: InvocationRegistry<A, O>,
    ledger: VerifyLedger<A>,
}

/// One declared member of a double.
///
/// `A` is the argument tuple (`()` for no arguments, the bare type for one,
/// a tuple otherwise), `R` the result type and `K` the effect kind.
pub struct Member<A, R, K: Effect<R>> {
    shared: Arc<ScopeShared>,
    double: DoubleId,
    owner: Arc<str>,
    id: MemberId,
    state: ReentrantMutex<RefCell<MemberState<A, K::Output>>>,
    _result: PhantomData<fn() -> R>,
}

impl<A, R, K: Effect<R>> Member<A, R, K> {
    /// The member's identity.
    #[must_use]
    pub fn id(&self) -> &MemberId {
        &self.id
    }

    /// The owning double.
    #[must_use]
    pub fn double(&self) -> DoubleId {
        self.double
    }

    /// The owning double's contract name.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub(crate) fn belongs_to(&self, shared: &Arc<ScopeShared>) -> bool {
        Arc::ptr_eq(&self.shared, shared)
    }

    /// `read` must not call back into the member.
    pub(crate) fn with_ledger<T>(&self, read: impl FnOnce(&VerifyLedger<A>) -> T) -> T {
        let guard = self.state.lock();
        let state = guard.borrow();
        read(&state.ledger)
    }

    fn with_state<T>(&self, update: impl FnOnce(&mut MemberState<A, K::Output>) -> T) -> T {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        update(&mut state)
    }
}

impl<A, R, K> Member<A, R, K>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    K: Effect<R>,
{
    /// Begins a stub expression for calls accepted by `matcher`.
    #[must_use = "a stub registers nothing until a then_* behavior is added"]
    pub fn when(&self, matcher: impl IntoMatcher<A>) -> Stub<'_, A, R, K> {
        Stub::new(self, matcher.into_matcher())
    }

    pub(crate) fn register(
        &self,
        matcher: Matcher<A>,
        behavior: Behavior<A, K::Output>,
    ) -> SlotHandle {
        let description = matcher.description().to_owned();
        let handle = self.with_state(|state| state.registry.register(matcher, behavior));
        debug!(
            double = ?self.double,
            member = %self.id,
            matcher = %description,
            slot = handle.index(),
            "stub registered"
        );
        handle
    }

    pub(crate) fn append_behavior(&self, handle: SlotHandle, behavior: Behavior<A, K::Output>) {
        let appended = self.with_state(|state| state.registry.append_behavior(handle, behavior));
        debug_assert!(appended, "slot handle issued by another member");
        debug!(
            double = ?self.double,
            member = %self.id,
            slot = handle.index(),
            "stub behavior appended"
        );
    }

    /// Records the call, resolves it and evaluates the chosen behavior
    /// after every lock is released.
    ///
    /// Matchers see a call that is already recorded, so one reading the
    /// member's history observes it.
    fn invoke(&self, args: A) -> K::Output {
        let arguments = format!("{args:?}");
        let (seq, resolved) = self
            .shared
            .journal
            .record(self.double, &self.id, arguments, |seq| {
                let _guard = self.state.lock();
                let matchers = self.with_state(|state| {
                    state.ledger.record(seq, args.clone());
                    state.registry.matchers()
                });
                let resolved = matchers
                    .iter()
                    .rposition(|matcher| matcher.matches(&args))
                    .and_then(|index| {
                        self.with_state(|state| state.registry.take(SlotHandle::from_index(index)))
                    });
                (seq, resolved)
            });
        let Some(resolved) = resolved else {
            let failure =
                Error::unmatched_call(&self.owner, self.double, &self.id, &format!("{args:?}"));
            self.shared.halt(failure, Some(self.double));
        };
        trace!(
            double = ?self.double,
            member = %self.id,
            seq = seq.get(),
            slot = resolved.slot.index(),
            position = resolved.position,
            "call resolved"
        );
        (resolved.behavior)(&args)
    }

    /// Verifies that `times` accepts the number of unclaimed calls accepted
    /// by `matcher`, and claims them if so.
    ///
    /// Returns the observed count. On failure the reporter is invoked, no
    /// call is claimed and a [`CountMismatch`](crate::ErrorKind::CountMismatch)
    /// error is returned.
    pub fn verify(&self, matcher: impl IntoMatcher<A>, times: Times) -> Result<usize> {
        let matcher = matcher.into_matcher();
        let verdict = {
            let _guard = self.state.lock();
            let unclaimed = self.with_state(|state| state.ledger.unclaimed());
            let candidates: Vec<usize> = unclaimed
                .into_iter()
                .filter(|(_, args)| matcher.matches(args))
                .map(|(index, _)| index)
                .collect();
            self.with_state(|state| state.ledger.settle(&candidates, &times))
        };
        if verdict.satisfied {
            debug!(
                double = ?self.double,
                member = %self.id,
                matcher = %matcher,
                times = %times,
                observed = verdict.observed,
                "verification passed"
            );
            return Ok(verdict.observed);
        }
        let failure = Error::count_mismatch(
            &self.owner,
            self.double,
            &self.id,
            matcher.description(),
            times.description(),
            verdict.observed,
        );
        self.shared.fail(failure, self.double)
    }

    /// [`verify`](Self::verify) with the default times matcher, exactly once.
    pub fn verify_once(&self, matcher: impl IntoMatcher<A>) -> Result<usize> {
        self.verify(matcher, Times::default())
    }

    /// Arguments of every call, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<A> {
        self.with_ledger(|ledger| ledger.log().arguments())
    }

    /// Number of calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.with_ledger(|ledger| ledger.log().len())
    }

    /// Recorded and claimed call counts.
    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        self.with_ledger(VerifyLedger::stats)
    }
}

impl<A, R> Member<A, R, Blocking>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    R: 'static,
{
    /// Calls the member.
    ///
    /// # Panics
    ///
    /// Halts the test if no stub accepts `args`.
    pub fn call(&self, args: A) -> R {
        self.invoke(args)
    }
}

impl<A, R, E> Member<A, R, Fallible<E>>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    R: 'static,
    E: 'static,
{
    /// Calls the member; stubbed errors come back as `Err`.
    ///
    /// # Panics
    ///
    /// Halts the test if no stub accepts `args`.
    pub fn call(&self, args: A) -> core::result::Result<R, E> {
        self.invoke(args)
    }
}

impl<A, R> Member<A, R, Async>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    R: Send + 'static,
{
    /// Calls the member. The call is recorded and resolved before this
    /// returns; only the stubbed behavior is awaited.
    ///
    /// # Panics
    ///
    /// Halts the test if no stub accepts `args`.
    pub fn call(&self, args: A) -> Boxed<R> {
        self.invoke(args)
    }
}

impl<A, R, E> Member<A, R, AsyncFallible<E>>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    /// Calls the member. The call is recorded and resolved before this
    /// returns; only the stubbed behavior is awaited.
    ///
    /// # Panics
    ///
    /// Halts the test if no stub accepts `args`.
    pub fn call(&self, args: A) -> Boxed<core::result::Result<R, E>> {
        self.invoke(args)
    }
}

impl<A, R, E> Member<A, R, Rethrows<E>>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    R: 'static,
    E: 'static,
{
    /// Calls the member. A stubbed error is handed to `handler`, which
    /// either recovers with `Ok` or re-raises with `Err`.
    ///
    /// # Panics
    ///
    /// Halts the test if no stub accepts `args`.
    pub fn call<F, H>(&self, args: A, handler: H) -> core::result::Result<R, F>
    where
        H: FnOnce(E) -> core::result::Result<R, F>,
    {
        self.invoke(args).or_else(handler)
    }

    /// Calls the member from a call site that does not propagate errors;
    /// `recover` turns a stubbed error into a value.
    ///
    /// # Panics
    ///
    /// Halts the test if no stub accepts `args`.
    pub fn call_infallible(&self, args: A, recover: impl FnOnce(E) -> R) -> R {
        match self.invoke(args) {
            Ok(value) => value,
            Err(failure) => recover(failure),
        }
    }
}

impl<A, R, E> Member<A, R, AsyncRethrows<E>>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    /// Calls the member. Once the stubbed behavior resolves to an error, the
    /// error is handed to `handler`, which recovers or re-raises.
    ///
    /// # Panics
    ///
    /// Halts the test if no stub accepts `args`.
    pub fn call<F, H>(&self, args: A, handler: H) -> Boxed<core::result::Result<R, F>>
    where
        F: Send + 'static,
        H: FnOnce(E) -> core::result::Result<R, F> + Send + 'static,
    {
        let pending = self.invoke(args);
        Box::pin(async move { pending.await.or_else(handler) })
    }

    /// Async counterpart of `call_infallible`.
    ///
    /// # Panics
    ///
    /// Halts the test if no stub accepts `args`.
    pub fn call_infallible<H>(&self, args: A, recover: H) -> Boxed<R>
    where
        H: FnOnce(E) -> R + Send + 'static,
    {
        let pending = self.invoke(args);
        Box::pin(async move {
            match pending.await {
                Ok(value) => value,
                Err(failure) => recover(failure),
            }
        })
    }
}

impl<A, R, K: Effect<R>> fmt::Debug for Member<A, R, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("double", &self.double)
            .field("owner", &self.owner)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
