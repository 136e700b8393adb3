//! The model graph: builder surface, evidence, and the inference entry points.
pub mod dag;
pub mod error;

pub use dag::Graph;
pub use error::GraphError;
