//! Member identities.
//!
//! A [`MemberId`] names one declared member of a behavioral contract: its
//! declared name, its ordered parameter labels, whether it is a method or a
//! property/indexer accessor, and its [`EffectKind`]. The identity selects
//! the typed registry and call log of the member and labels every
//! diagnostic the engine produces.

use core::fmt;
use std::sync::Arc;

/// The call semantics a member may have.
///
/// "Conditional" kinds propagate an error only when the specific call site
/// propagates errors; the caller supplies an error continuation at call
/// time that decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EffectKind {
    /// Plain synchronous call.
    Sync,
    /// Synchronous call that may fail.
    Fallible,
    /// Asynchronous call.
    Async,
    /// Asynchronous call that may fail.
    AsyncFallible,
    /// Synchronous call whose failure is routed through a caller continuation.
    ConditionalFallible,
    /// Asynchronous call whose failure is routed through a caller continuation.
    AsyncConditionalFallible,
}

impl EffectKind {
    /// All effect kinds, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Sync,
        Self::Fallible,
        Self::Async,
        Self::AsyncFallible,
        Self::ConditionalFallible,
        Self::AsyncConditionalFallible,
    ];

    /// Returns true if evaluating a behavior of this kind suspends.
    #[must_use]
    pub const fn is_async(self) -> bool {
        matches!(
            self,
            Self::Async | Self::AsyncFallible | Self::AsyncConditionalFallible
        )
    }

    /// Returns true if a behavior of this kind may produce an error.
    #[must_use]
    pub const fn is_fallible(self) -> bool {
        !matches!(self, Self::Sync | Self::Async)
    }

    /// Returns true if errors are routed through a caller continuation.
    #[must_use]
    pub const fn is_conditional(self) -> bool {
        matches!(
            self,
            Self::ConditionalFallible | Self::AsyncConditionalFallible
        )
    }

    /// Short stable name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Fallible => "fallible",
            Self::Async => "async",
            Self::AsyncFallible => "async-fallible",
            Self::ConditionalFallible => "conditional-fallible",
            Self::AsyncConditionalFallible => "async-conditional-fallible",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of declaration a member identity stands for.
///
/// Getter and setter of the same property are distinct roles and therefore
/// distinct identities with separate logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberRole {
    /// A method.
    Method,
    /// A property read.
    Getter,
    /// A property write.
    Setter,
    /// An indexer read.
    SubscriptGetter,
    /// An indexer write.
    SubscriptSetter,
}

/// Stable identity of one declared member.
///
/// Cheap to clone: the name and parameter labels are shared.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId {
    name: Arc<str>,
    params: Arc<[Arc<str>]>,
    role: MemberRole,
    effect: EffectKind,
}

impl MemberId {
    fn build(name: &str, params: &[&str], role: MemberRole, effect: EffectKind) -> Self {
        Self {
            name: Arc::from(name),
            params: params.iter().map(|p| Arc::from(*p)).collect(),
            role,
            effect,
        }
    }

    /// Identity of a method with the given ordered parameter labels.
    #[must_use]
    pub fn method(name: &str, params: &[&str], effect: EffectKind) -> Self {
        Self::build(name, params, MemberRole::Method, effect)
    }

    /// Identity of a property getter.
    #[must_use]
    pub fn getter(property: &str, effect: EffectKind) -> Self {
        Self::build(property, &[], MemberRole::Getter, effect)
    }

    /// Identity of a property setter. Setters are always synchronous.
    #[must_use]
    pub fn setter(property: &str) -> Self {
        Self::build(property, &["newValue"], MemberRole::Setter, EffectKind::Sync)
    }

    /// Identity of an indexer getter.
    #[must_use]
    pub fn subscript_getter(params: &[&str], effect: EffectKind) -> Self {
        Self::build("subscript", params, MemberRole::SubscriptGetter, effect)
    }

    /// Identity of an indexer setter. Setters are always synchronous.
    #[must_use]
    pub fn subscript_setter(params: &[&str]) -> Self {
        let mut all = params.to_vec();
        all.push("newValue");
        Self::build("subscript", &all, MemberRole::SubscriptSetter, EffectKind::Sync)
    }

    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered parameter labels.
    pub fn params(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.params.iter().map(AsRef::as_ref)
    }

    /// Number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Declaration role.
    #[must_use]
    pub const fn role(&self) -> MemberRole {
        self.role
    }

    /// Effect kind.
    #[must_use]
    pub const fn effect(&self) -> EffectKind {
        self.effect
    }

    fn write_params(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(param)?;
        }
        Ok(())
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            MemberRole::Method => {
                write!(f, "{}(", self.name)?;
                self.write_params(f)?;
                f.write_str(")")
            }
            MemberRole::Getter => write!(f, "{}.get", self.name),
            MemberRole::Setter => write!(f, "{}.set", self.name),
            MemberRole::SubscriptGetter | MemberRole::SubscriptSetter => {
                f.write_str("[")?;
                // The setter's trailing value label is not part of the index.
                let shown = if self.role == MemberRole::SubscriptSetter {
                    self.params.len().saturating_sub(1)
                } else {
                    self.params.len()
                };
                for (i, param) in self.params.iter().take(shown).enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(param)?;
                }
                let suffix = if self.role == MemberRole::SubscriptSetter {
                    "set"
                } else {
                    "get"
                };
                write!(f, "].{suffix}")
            }
        }
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberId({self} {})", self.effect)
    }
}
