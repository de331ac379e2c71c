//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate scene state.
//! - Render output derives from scene state and view alone.
//!
//! Provides the trait plus a debug text renderer, used by the CLI and by
//! tests that need to observe a frame without a GPU. The trait is stable;
//! the wgpu implementation lives in `stagelight-render-wgpu`.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "stagelight-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
