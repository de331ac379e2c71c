//! Pointer input mapped to high-level orbit actions.
//!
//! # Invariants
//! - Camera and driver code consume actions, never raw window events.
//! - The tracker holds no reference to the windowing layer.

pub mod action;

pub use action::{OrbitAction, PointerButton, PointerTracker};

pub fn crate_info() -> &'static str {
    "stagelight-input v0.1.0"
}
