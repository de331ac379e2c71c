use stagelight_common::NodeId;
use stagelight_scene::{Fog, NodeKind, SceneGraph};

/// Scene inspector for developer tooling.
///
/// Provides read-only queries against scene state for debugging and
/// development UI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(scene: &SceneGraph) -> SceneSummary {
        let mut meshes = 0;
        let mut lights = 0;
        let mut helpers = 0;
        for node in scene.nodes() {
            match node.kind {
                NodeKind::Mesh(_) => meshes += 1,
                NodeKind::Light(_) => lights += 1,
                NodeKind::Helper(_) => helpers += 1,
            }
        }
        SceneSummary {
            nodes: scene.len(),
            meshes,
            lights,
            helpers,
            fog: match scene.fog {
                None => "none",
                Some(Fog::Linear { .. }) => "linear",
                Some(Fog::Exp2 { .. }) => "exp2",
            },
            shadows: scene.shadows,
        }
    }

    /// Inspect a specific node.
    pub fn inspect_node(scene: &SceneGraph, id: NodeId) -> Option<NodeInfo> {
        scene.get(id).map(|node| {
            let p = node.transform.position;
            let s = node.transform.scale;
            NodeInfo {
                id,
                name: node.name.clone(),
                kind: node.kind.kind_name(),
                position: [p.x, p.y, p.z],
                scale: [s.x, s.y, s.z],
            }
        })
    }

    /// List all node ids, in insertion order.
    pub fn list_nodes(scene: &SceneGraph) -> Vec<NodeId> {
        scene.nodes().iter().map(|n| n.id).collect()
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub nodes: usize,
    pub meshes: usize,
    pub lights: usize,
    pub helpers: usize,
    pub fog: &'static str,
    pub shadows: bool,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} meshes={} lights={} helpers={} fog={} shadows={}",
            self.nodes,
            self.meshes,
            self.lights,
            self.helpers,
            self.fog,
            if self.shadows { "on" } else { "off" }
        )
    }
}

/// Detailed info about a single node.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub kind: &'static str,
    pub position: [f32; 3],
    pub scale: [f32; 3],
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Node [{}] {} ({}) pos=({:.2}, {:.2}, {:.2})",
            self.id.short(),
            self.name,
            self.kind,
            self.position[0],
            self.position[1],
            self.position[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagelight_scene::ScenePreset;

    #[test]
    fn summary_empty_scene() {
        let scene = SceneGraph::new();
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.nodes, 0);
        assert_eq!(summary.fog, "none");
        assert!(!summary.shadows);
    }

    #[test]
    fn summary_counts_studio_by_kind() {
        let built = ScenePreset::Studio.build();
        let summary = SceneInspector::summary(&built.scene);
        assert_eq!(summary.meshes, 3);
        assert_eq!(summary.lights, 2);
        assert_eq!(summary.helpers, 3);
        assert_eq!(summary.nodes, 8);
        assert_eq!(summary.fog, "linear");
        assert!(summary.shadows);
    }

    #[test]
    fn inspect_node_found() {
        let built = ScenePreset::BouncingSphere.build();
        let id = built.bouncer.unwrap();
        let info = SceneInspector::inspect_node(&built.scene, id).unwrap();
        assert_eq!(info.kind, "mesh");
        assert_eq!(info.position, [-10.0, 10.0, 0.0]);
    }

    #[test]
    fn inspect_node_not_found() {
        let scene = SceneGraph::new();
        assert!(SceneInspector::inspect_node(&scene, NodeId::new()).is_none());
    }

    #[test]
    fn list_nodes_follows_insertion_order() {
        let built = ScenePreset::Studio.build();
        let ids = SceneInspector::list_nodes(&built.scene);
        let expected: Vec<NodeId> = built.scene.nodes().iter().map(|n| n.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn summary_display() {
        let built = ScenePreset::Axes.build();
        let s = format!("{}", SceneInspector::summary(&built.scene));
        assert!(s.contains("nodes=1"));
        assert!(s.contains("shadows=off"));
    }
}
