//! Stub registration and resolution.
//!
//! - [`effect`]: the six effect kinds and the behavior shape each produces
//! - [`slot`]: one matcher with its stacked behaviors
//! - [`registry`]: the ordered slots of one member, resolved newest first
//! - [`builder`]: the `when(...).then_*(...)` expression

pub mod builder;
pub mod effect;
pub mod registry;
pub mod slot;

pub use builder::Stub;
pub use effect::{
    Async, AsyncFallible, AsyncRethrows, Behavior, Blocking, Effect, Fallible, FallibleEffect,
    Rethrows,
};
pub use registry::{InvocationRegistry, Resolved};
pub use slot::InvocationSlot;
