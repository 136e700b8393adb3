//! Structural analysis over the node arena.
pub mod topology;
