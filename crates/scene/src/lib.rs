//! Scene graph: the authoritative set of renderable nodes and their transforms.
//!
//! # Invariants
//! - Nodes are retained for the process lifetime; there is no removal API.
//! - Iteration follows insertion order.
//! - All mutations flow through explicit typed accessors.

pub mod graph;
pub mod node;
pub mod preset;

pub use graph::{Node, SceneGraph};
pub use node::{Fog, Geometry, HelperNode, LightNode, Material, MeshNode, NodeKind};
pub use preset::{PresetScene, ScenePreset};
