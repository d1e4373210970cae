//! Host-agnostic reactive plumbing.
//!
//! `Observable` is the mutable cell presentation layers bind to; `Scope` is
//! the "run this when the owner goes away" registration point. Neither
//! assumes a particular UI toolkit.

mod observable;
mod scope;

pub use observable::{Observable, SubscriptionId};
pub use scope::Scope;
