use glam::{Mat4, Vec3};
use stagelight_scene::{Fog, HelperNode, LightNode, NodeKind, SceneGraph};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(-10.0, 30.0, 30.0),
            target: Vec3::ZERO,
            fov_y: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl RenderView {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads scene state and a view configuration, then produces
/// output. It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of the given scene from the given view.
    fn render(&mut self, scene: &SceneGraph, view: &RenderView) -> Self::Output;
}

/// Text renderer for headless use.
///
/// Produces a human-readable snapshot of the scene: one line per node with
/// its kind-specific parameters. Used by the CLI frame loop and by tests
/// that assert on what a frame observed.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &SceneGraph, view: &RenderView) -> String {
        let mut out = String::new();
        let fog = match scene.fog {
            None => "none",
            Some(Fog::Linear { .. }) => "linear",
            Some(Fog::Exp2 { .. }) => "exp2",
        };
        out.push_str(&format!(
            "=== Scene (nodes={}, shadows={}, fog={}) ===\n",
            scene.len(),
            if scene.shadows { "on" } else { "off" },
            fog
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_y.to_degrees()
        ));

        for node in scene.nodes() {
            let p = node.transform.position;
            let detail = match &node.kind {
                NodeKind::Mesh(mesh) => {
                    let c = mesh.material.color;
                    format!(
                        "color=({:.2}, {:.2}, {:.2}){}",
                        c.r,
                        c.g,
                        c.b,
                        if mesh.material.wireframe {
                            " wireframe"
                        } else {
                            ""
                        }
                    )
                }
                NodeKind::Light(LightNode::Spot {
                    angle,
                    penumbra,
                    intensity,
                    ..
                }) => format!(
                    "angle={angle:.3} penumbra={penumbra:.2} intensity={intensity:.2}"
                ),
                NodeKind::Light(LightNode::Ambient { intensity, .. })
                | NodeKind::Light(LightNode::Directional { intensity, .. }) => {
                    format!("intensity={intensity:.2}")
                }
                NodeKind::Helper(HelperNode::SpotCone { angle, range, .. }) => {
                    format!("angle={angle:.3} range={range:.1}")
                }
                NodeKind::Helper(_) => String::new(),
            };
            out.push_str(&format!(
                "  [{}] {:<12} {:<11} pos=({:.2}, {:.2}, {:.2}) {}\n",
                node.id.short(),
                node.name,
                node.kind.kind_name(),
                p.x,
                p.y,
                p.z,
                detail
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagelight_scene::ScenePreset;

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = SceneGraph::new();
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, &RenderView::default());

        assert!(output.contains("nodes=0"));
        assert!(output.contains("shadows=off"));
        assert!(output.contains("fog=none"));
    }

    #[test]
    fn debug_renderer_lists_studio_nodes() {
        let built = ScenePreset::Studio.build();
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&built.scene, &RenderView::default());

        assert!(output.contains("shadows=on"));
        assert!(output.contains("fog=linear"));
        assert!(output.contains("sphere"));
        assert!(output.contains("angle=0.200"));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.target, Vec3::ZERO);
        assert!((view.fov_y.to_degrees() - 45.0).abs() < 1e-4);
        let vp = view.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }
}
