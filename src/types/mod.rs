//! Core identifier and identity types.
//!
//! - [`id`]: `DoubleId`, `CallSeq`, `SlotHandle`
//! - [`member`]: `MemberId`, `MemberRole`, `EffectKind`

pub mod id;
pub mod member;

pub use id::{CallSeq, DoubleId, SlotHandle};
pub use member::{EffectKind, MemberId, MemberRole};
