//! The type system: scalar domains, values, and construction-time signature checks.
//!
//! Every insertion into the graph passes through here. Nothing downstream of
//! construction re-checks types; the forward simulator trusts them.

pub use self::checker::Signature;
pub use self::domain::{AtomicType, Value};
pub use self::error::{Arity, TypeError};

mod domain;
mod error;
pub mod checker;
