//! Shared types for the stagelight scene toolkit.
//!
//! # Invariants
//! - Types here are plain data: no scene logic, no renderer knowledge.
//! - Everything is `Copy`/cheaply clonable and serde-derivable.

mod color;
mod types;

pub use color::Color;
pub use types::{NodeId, Transform};
