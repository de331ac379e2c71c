//! Developer Tooling: scene inspector and summaries.
//!
//! # Invariants
//! - Tools are read-only over scene state.

pub mod inspector;

pub use inspector::{NodeInfo, SceneInspector, SceneSummary};

pub fn crate_info() -> &'static str {
    "stagelight-tools v0.1.0"
}
