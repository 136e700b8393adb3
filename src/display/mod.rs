//! Text renderings for debugging and audit output.
pub mod trace;

pub use trace::{format_graph, format_trace};
