//! wgpu render backend for stagelight scenes.
//!
//! Renders scene meshes as instanced unit primitives (cuboid, sphere,
//! plane), wireframe materials as instanced edge lines, and helpers (axes,
//! grid, spot cone) as colored line batches. A depth-only pass from the
//! shadow-casting light feeds a comparison sampler in the main pass; fog is
//! applied in the fragment shader. Camera is an orbit model around a target
//! point.
//!
//! # Invariants
//! - The renderer never mutates scene state.
//! - Camera motion happens outside the frame driver; the driver only ever
//!   receives the resulting view.

mod camera;
mod gpu;
mod mesh;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::{SceneFramePass, WgpuSceneRenderer};
