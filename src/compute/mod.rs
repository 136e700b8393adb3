//! The forward simulator: compiles a graph's support into a linear program
//! and executes it one trial at a time.
pub mod bytecode;
pub mod engine;
pub mod kernel;
pub mod ledger;
pub mod rng;

pub use bytecode::{Compiler, Program};
pub use engine::{Engine, Trial};
pub use ledger::{ComputationError, Ledger};
