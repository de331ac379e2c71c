use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stagelight_common::{Color, NodeId, Transform};

use crate::node::{Fog, HelperNode, LightNode, MeshNode, NodeKind};

/// One entry in the scene graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
}

/// The authoritative scene state.
///
/// Nodes are stored in insertion order and never removed; an id index sits
/// alongside for O(log n) lookup. Renderers and tools derive from this
/// state, they never own it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    index: BTreeMap<NodeId, usize>,
    /// Clear color used by renderers.
    pub background: Color,
    /// Optional distance fog.
    pub fog: Option<Fog>,
    /// Master switch for the renderer's shadow pass.
    pub shadows: bool,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Empty scene with a dark background, no fog, shadows off.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: BTreeMap::new(),
            background: Color::new(0.1, 0.1, 0.15),
            fog: None,
            shadows: false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let i = *self.index.get(&id)?;
        Some(&mut self.nodes[i])
    }

    fn add(&mut self, name: impl Into<String>, transform: Transform, kind: NodeKind) -> NodeId {
        let id = NodeId::new();
        self.index.insert(id, self.nodes.len());
        self.nodes.push(Node {
            id,
            name: name.into(),
            transform,
            kind,
        });
        id
    }

    pub fn add_mesh(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        mesh: MeshNode,
    ) -> NodeId {
        self.add(name, transform, NodeKind::Mesh(mesh))
    }

    pub fn add_light(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        light: LightNode,
    ) -> NodeId {
        self.add(name, transform, NodeKind::Light(light))
    }

    pub fn add_helper(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        helper: HelperNode,
    ) -> NodeId {
        self.add(name, transform, NodeKind::Helper(helper))
    }

    pub fn mesh(&self, id: NodeId) -> Option<&MeshNode> {
        match &self.get(id)?.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut MeshNode> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn light(&self, id: NodeId) -> Option<&LightNode> {
        match &self.get(id)?.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn light_mut(&mut self, id: NodeId) -> Option<&mut LightNode> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn helper(&self, id: NodeId) -> Option<&HelperNode> {
        match &self.get(id)?.kind {
            NodeKind::Helper(helper) => Some(helper),
            _ => None,
        }
    }

    pub fn helper_mut(&mut self, id: NodeId) -> Option<&mut HelperNode> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Helper(helper) => Some(helper),
            _ => None,
        }
    }

    /// Re-copy a spot light's parameters into its cone helper.
    ///
    /// The cone's `range` is rederived from the light's current distance to
    /// the origin it aims at. Returns false if either id fails to resolve
    /// to the expected node kind.
    pub fn refresh_spot_cone(&mut self, cone: NodeId) -> bool {
        let Some(&HelperNode::SpotCone { light, .. }) = self.helper(cone) else {
            return false;
        };
        let Some(&LightNode::Spot { angle, .. }) = self.light(light) else {
            return false;
        };
        let range = self
            .get(light)
            .map(|n| n.transform.position.length())
            .unwrap_or(0.0);
        if let Some(HelperNode::SpotCone {
            angle: cone_angle,
            range: cone_range,
            ..
        }) = self.helper_mut(cone)
        {
            *cone_angle = angle;
            *cone_range = range;
            true
        } else {
            false
        }
    }

    /// Update a node's transform. Returns false for an unknown id.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> bool {
        if let Some(node) = self.get_mut(id) {
            node.transform = transform;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Geometry, Material};
    use glam::Vec3;

    fn sphere() -> MeshNode {
        MeshNode::new(
            Geometry::Sphere { radius: 4.0 },
            Material::lit(Color::hex(0x0000ff)),
        )
    }

    #[test]
    fn scene_starts_empty() {
        let scene = SceneGraph::new();
        assert!(scene.is_empty());
        assert!(scene.fog.is_none());
        assert!(!scene.shadows);
    }

    #[test]
    fn nodes_keep_insertion_order() {
        let mut scene = SceneGraph::new();
        let a = scene.add_helper("axes", Transform::default(), HelperNode::Axes { length: 5.0 });
        let b = scene.add_mesh("sphere", Transform::default(), sphere());
        let c = scene.add_light(
            "ambient",
            Transform::default(),
            LightNode::Ambient {
                color: Color::hex(0x333333),
                intensity: 1.0,
            },
        );
        let order: Vec<NodeId> = scene.nodes().iter().map(|n| n.id).collect();
        assert_eq!(order, vec![a, b, c]);
    }

    #[test]
    fn typed_accessors_reject_wrong_kind() {
        let mut scene = SceneGraph::new();
        let mesh_id = scene.add_mesh("sphere", Transform::default(), sphere());
        assert!(scene.mesh(mesh_id).is_some());
        assert!(scene.light(mesh_id).is_none());
        assert!(scene.helper(mesh_id).is_none());
    }

    #[test]
    fn unknown_id_resolves_to_none() {
        let scene = SceneGraph::new();
        assert!(scene.get(NodeId::new()).is_none());
    }

    #[test]
    fn set_transform_updates_node() {
        let mut scene = SceneGraph::new();
        let id = scene.add_mesh("sphere", Transform::default(), sphere());
        let moved = Transform::at(Vec3::new(0.0, 8.4, 0.0));
        assert!(scene.set_transform(id, moved));
        assert_eq!(scene.get(id).unwrap().transform.position.y, 8.4);
        assert!(!scene.set_transform(NodeId::new(), moved));
    }

    #[test]
    fn refresh_spot_cone_copies_light_params() {
        let mut scene = SceneGraph::new();
        let light = scene.add_light(
            "spot",
            Transform::at(Vec3::new(-100.0, 100.0, 0.0)),
            LightNode::Spot {
                color: Color::WHITE,
                intensity: 1.0,
                angle: 0.2,
                penumbra: 0.0,
                cast_shadow: true,
            },
        );
        let cone = scene.add_helper(
            "spot cone",
            Transform::default(),
            HelperNode::SpotCone {
                light,
                angle: 0.0,
                range: 0.0,
            },
        );

        assert!(scene.refresh_spot_cone(cone));
        let Some(&HelperNode::SpotCone { angle, range, .. }) = scene.helper(cone) else {
            panic!("cone helper missing");
        };
        assert_eq!(angle, 0.2);
        let expected = Vec3::new(-100.0, 100.0, 0.0).length();
        assert!((range - expected).abs() < 1e-4);
    }

    #[test]
    fn refresh_spot_cone_rejects_bad_targets() {
        let mut scene = SceneGraph::new();
        let mesh_id = scene.add_mesh("sphere", Transform::default(), sphere());
        // Not a helper at all.
        assert!(!scene.refresh_spot_cone(mesh_id));

        // Helper whose light id points at a mesh.
        let cone = scene.add_helper(
            "bad cone",
            Transform::default(),
            HelperNode::SpotCone {
                light: mesh_id,
                angle: 0.0,
                range: 0.0,
            },
        );
        assert!(!scene.refresh_spot_cone(cone));
    }
}
