use glam::{EulerRot, Quat};
use stagelight_common::NodeId;
use stagelight_render::{RenderView, Renderer};
use stagelight_scene::{LightNode, NodeKind, PresetScene, SceneGraph};

use crate::controls::ControlState;

/// Spin rate of the timestamp-driven mesh, radians per millisecond.
pub const SPIN_RATE: f32 = 0.001;
/// Peak height of the phase-driven oscillation.
pub const BOUNCE_AMPLITUDE: f32 = 10.0;

/// Rotation angle for a given frame timestamp, applied to both the X and Y
/// axes of the bound spinner mesh.
pub fn spin_angle(timestamp_ms: f64) -> f32 {
    (timestamp_ms * SPIN_RATE as f64) as f32
}

/// A binding target failed validation against the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("node {0:?} not found in scene")]
    NotFound(NodeId),
    #[error("node {0:?} is not a mesh")]
    NotAMesh(NodeId),
    #[error("node {0:?} is not a spot light")]
    NotASpotLight(NodeId),
    #[error("node {0:?} is not a spot-cone helper")]
    NotASpotCone(NodeId),
}

/// The scene nodes a [`FrameDriver`] animates. Every binding is optional;
/// an absent binding simply skips that effect each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bindings {
    /// Mesh whose rotation tracks the frame timestamp.
    pub spinner: Option<NodeId>,
    /// Mesh whose height tracks the phase accumulator; also the target of
    /// the color and wireframe controls.
    pub bouncer: Option<NodeId>,
    /// Spot light receiving the angle/penumbra/intensity controls.
    pub spot: Option<NodeId>,
    /// Cone helper refreshed after the spot light is updated.
    pub cone: Option<NodeId>,
}

impl Bindings {
    /// Validate each provided id against the scene: it must exist and be
    /// the node kind that binding slot animates.
    pub fn resolve(
        scene: &SceneGraph,
        spinner: Option<NodeId>,
        bouncer: Option<NodeId>,
        spot: Option<NodeId>,
        cone: Option<NodeId>,
    ) -> Result<Self, BindingError> {
        for id in [spinner, bouncer].into_iter().flatten() {
            match scene.get(id) {
                None => return Err(BindingError::NotFound(id)),
                Some(node) if !matches!(node.kind, NodeKind::Mesh(_)) => {
                    return Err(BindingError::NotAMesh(id));
                }
                Some(_) => {}
            }
        }
        if let Some(id) = spot {
            if scene.get(id).is_none() {
                return Err(BindingError::NotFound(id));
            }
            if !matches!(scene.light(id), Some(LightNode::Spot { .. })) {
                return Err(BindingError::NotASpotLight(id));
            }
        }
        if let Some(id) = cone {
            if scene.get(id).is_none() {
                return Err(BindingError::NotFound(id));
            }
            if !matches!(
                scene.helper(id),
                Some(stagelight_scene::HelperNode::SpotCone { .. })
            ) {
                return Err(BindingError::NotASpotCone(id));
            }
        }
        Ok(Self {
            spinner,
            bouncer,
            spot,
            cone,
        })
    }

    /// Bindings for a freshly built preset scene.
    pub fn from_preset(built: &PresetScene) -> Result<Self, BindingError> {
        Self::resolve(
            &built.scene,
            built.spinner,
            built.bouncer,
            built.spot,
            built.cone,
        )
    }
}

/// Drives one scene through its per-refresh updates.
///
/// Owned by the application; invoked once per display refresh with the
/// current timestamp. The phase accumulator used for the bounce is the only
/// state that persists between frames.
#[derive(Debug)]
pub struct FrameDriver {
    bindings: Bindings,
    phase: f32,
}

impl FrameDriver {
    pub fn new(bindings: Bindings) -> Self {
        Self {
            bindings,
            phase: 0.0,
        }
    }

    /// Current value of the phase accumulator.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// One frame: apply controls, advance transforms, render.
    ///
    /// The order is load-bearing; the render call must see this frame's
    /// transforms, and control writes must land before the transforms that
    /// read them.
    pub fn on_frame<R: Renderer>(
        &mut self,
        scene: &mut SceneGraph,
        controls: &ControlState,
        timestamp_ms: f64,
        renderer: &mut R,
        view: &RenderView,
    ) -> R::Output {
        self.apply_controls(scene, controls);
        self.advance(scene, controls, timestamp_ms);
        renderer.render(scene, view)
    }

    /// Copy the current control values onto the bound nodes and refresh the
    /// dependent cone helper.
    pub fn apply_controls(&self, scene: &mut SceneGraph, controls: &ControlState) {
        if let Some(id) = self.bindings.bouncer {
            if let Some(mesh) = scene.mesh_mut(id) {
                mesh.material.color = controls.sphere_color;
                mesh.material.wireframe = controls.wireframe;
            }
        }
        if let Some(id) = self.bindings.spot {
            if let Some(LightNode::Spot {
                angle,
                penumbra,
                intensity,
                ..
            }) = scene.light_mut(id)
            {
                *angle = controls.angle;
                *penumbra = controls.penumbra;
                *intensity = controls.intensity;
            }
        }
        if let Some(id) = self.bindings.cone {
            scene.refresh_spot_cone(id);
        }
    }

    /// Advance the time-driven transforms for this frame.
    pub fn advance(&mut self, scene: &mut SceneGraph, controls: &ControlState, timestamp_ms: f64) {
        if let Some(id) = self.bindings.spinner {
            if let Some(node) = scene.get_mut(id) {
                let a = spin_angle(timestamp_ms);
                node.transform.rotation = Quat::from_euler(EulerRot::XYZ, a, a, 0.0);
            }
        }

        self.phase += controls.speed;
        if let Some(id) = self.bindings.bouncer {
            if let Some(node) = scene.get_mut(id) {
                node.transform.position.y = BOUNCE_AMPLITUDE * self.phase.sin().abs();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagelight_common::Color;
    use stagelight_render::DebugTextRenderer;
    use stagelight_scene::{Geometry, HelperNode, ScenePreset};

    /// Renderer that reports the bound node's height at render time,
    /// proving the render call observes this frame's transforms.
    struct HeightProbe {
        target: NodeId,
    }

    impl Renderer for HeightProbe {
        type Output = f32;

        fn render(&mut self, scene: &SceneGraph, _view: &RenderView) -> f32 {
            scene.get(self.target).unwrap().transform.position.y
        }
    }

    fn studio() -> (SceneGraph, FrameDriver) {
        let built = ScenePreset::Studio.build();
        let bindings = Bindings::from_preset(&built).unwrap();
        (built.scene, FrameDriver::new(bindings))
    }

    #[test]
    fn spin_angle_is_time_over_thousand() {
        assert_eq!(spin_angle(0.0), 0.0);
        assert!((spin_angle(1000.0) - 1.0).abs() < 1e-6);
        assert!((spin_angle(2500.0) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn spinner_rotation_matches_timestamp() {
        let (mut scene, mut driver) = studio();
        let controls = ControlState::default();
        let spinner = driver.bindings().spinner.unwrap();

        driver.advance(&mut scene, &controls, 1000.0);

        let expected = Quat::from_euler(EulerRot::XYZ, 1.0, 1.0, 0.0);
        let got = scene.get(spinner).unwrap().transform.rotation;
        assert!(got.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn phase_accumulates_speed_per_frame() {
        let (mut scene, mut driver) = studio();
        let controls = ControlState {
            speed: 0.01,
            ..ControlState::default()
        };
        for frame in 0..300 {
            driver.advance(&mut scene, &controls, frame as f64 * 16.0);
        }
        assert!((driver.phase() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn bounce_stays_within_amplitude() {
        let (mut scene, mut driver) = studio();
        let controls = ControlState {
            speed: 0.07,
            ..ControlState::default()
        };
        let bouncer = driver.bindings().bouncer.unwrap();
        for frame in 0..500 {
            driver.advance(&mut scene, &controls, frame as f64 * 16.0);
            let y = scene.get(bouncer).unwrap().transform.position.y;
            assert!((0.0..=BOUNCE_AMPLITUDE).contains(&y), "y={y} out of range");
        }
    }

    #[test]
    fn controls_touch_only_the_bound_sphere() {
        let (mut scene, driver) = studio();
        let bouncer = driver.bindings().bouncer.unwrap();

        // Snapshot every other mesh's material before the apply.
        let others: Vec<(NodeId, _)> = scene
            .nodes()
            .iter()
            .filter(|n| n.id != bouncer)
            .filter_map(|n| match n.kind {
                NodeKind::Mesh(mesh) => Some((n.id, mesh.material)),
                _ => None,
            })
            .collect();
        assert!(!others.is_empty());

        let controls = ControlState {
            sphere_color: Color::hex(0xff00ff),
            wireframe: true,
            ..ControlState::default()
        };
        driver.apply_controls(&mut scene, &controls);

        let sphere = scene.mesh(bouncer).unwrap();
        assert_eq!(sphere.material.color, Color::hex(0xff00ff));
        assert!(sphere.material.wireframe);
        for (id, before) in others {
            assert_eq!(scene.mesh(id).unwrap().material, before);
        }
    }

    #[test]
    fn wireframe_toggle_leaves_geometry_and_position_alone() {
        let (mut scene, driver) = studio();
        let bouncer = driver.bindings().bouncer.unwrap();
        let before_geometry = scene.mesh(bouncer).unwrap().geometry;
        let before_position = scene.get(bouncer).unwrap().transform.position;

        let controls = ControlState {
            wireframe: true,
            ..ControlState::default()
        };
        driver.apply_controls(&mut scene, &controls);

        let mesh = scene.mesh(bouncer).unwrap();
        assert!(mesh.material.wireframe);
        assert_eq!(mesh.geometry, before_geometry);
        assert_eq!(scene.get(bouncer).unwrap().transform.position, before_position);
    }

    #[test]
    fn spot_and_cone_follow_the_angle_control() {
        let (mut scene, driver) = studio();
        let controls = ControlState {
            angle: 0.75,
            penumbra: 0.4,
            intensity: 0.6,
            ..ControlState::default()
        };
        driver.apply_controls(&mut scene, &controls);

        let spot = driver.bindings().spot.unwrap();
        let Some(&LightNode::Spot {
            angle,
            penumbra,
            intensity,
            ..
        }) = scene.light(spot)
        else {
            panic!("spot light missing");
        };
        assert_eq!(angle, 0.75);
        assert_eq!(penumbra, 0.4);
        assert_eq!(intensity, 0.6);

        let cone = driver.bindings().cone.unwrap();
        let Some(&HelperNode::SpotCone { angle, .. }) = scene.helper(cone) else {
            panic!("cone helper missing");
        };
        assert_eq!(angle, 0.75);
    }

    #[test]
    fn render_observes_this_frames_transforms() {
        let (mut scene, mut driver) = studio();
        let bouncer = driver.bindings().bouncer.unwrap();
        let controls = ControlState {
            speed: 0.5,
            ..ControlState::default()
        };
        let mut probe = HeightProbe { target: bouncer };

        let seen = driver.on_frame(&mut scene, &controls, 16.0, &mut probe, &RenderView::default());
        let expected = BOUNCE_AMPLITUDE * 0.5_f32.sin().abs();
        assert!((seen - expected).abs() < 1e-5);
    }

    #[test]
    fn bounce_scenario_matches_expected_heights() {
        let (mut scene, mut driver) = studio();
        let bouncer = driver.bindings().bouncer.unwrap();
        let mut renderer = DebugTextRenderer::new();
        let view = RenderView::default();

        // One frame with speed zero: the phase stays at 0, the sphere rests
        // on the ground.
        let still = ControlState {
            speed: 0.0,
            ..ControlState::default()
        };
        driver.on_frame(&mut scene, &still, 0.0, &mut renderer, &view);
        assert_eq!(scene.get(bouncer).unwrap().transform.position.y, 0.0);

        // 100 frames at speed 0.01 → phase 1.0 → y = 10·|sin 1|.
        let moving = ControlState {
            speed: 0.01,
            ..ControlState::default()
        };
        for frame in 1..=100 {
            driver.on_frame(&mut scene, &moving, frame as f64 * 16.0, &mut renderer, &view);
        }
        let y = scene.get(bouncer).unwrap().transform.position.y;
        assert!((y - 8.4147).abs() < 1e-2, "y={y}");

        // Another 100 frames → phase 2.0 → y = 10·|sin 2|.
        for frame in 101..=200 {
            driver.on_frame(&mut scene, &moving, frame as f64 * 16.0, &mut renderer, &view);
        }
        let y = scene.get(bouncer).unwrap().transform.position.y;
        assert!((y - 9.0930).abs() < 1e-2, "y={y}");
    }

    #[test]
    fn resolve_rejects_wrong_kinds() {
        let built = ScenePreset::Studio.build();
        let scene = built.scene;
        let spot = built.spot.unwrap();
        let bouncer = built.bouncer.unwrap();

        // A light where a mesh belongs.
        assert_eq!(
            Bindings::resolve(&scene, Some(spot), None, None, None),
            Err(BindingError::NotAMesh(spot))
        );
        // A mesh where the spot light belongs.
        assert_eq!(
            Bindings::resolve(&scene, None, None, Some(bouncer), None),
            Err(BindingError::NotASpotLight(bouncer))
        );
        // An id from nowhere.
        let ghost = NodeId::new();
        assert_eq!(
            Bindings::resolve(&scene, Some(ghost), None, None, None),
            Err(BindingError::NotFound(ghost))
        );
    }

    #[test]
    fn driver_without_bindings_still_renders() {
        let built = ScenePreset::Axes.build();
        let bindings = Bindings::from_preset(&built).unwrap();
        let mut scene = built.scene;
        let mut driver = FrameDriver::new(bindings);
        let mut renderer = DebugTextRenderer::new();

        let out = driver.on_frame(
            &mut scene,
            &ControlState::default(),
            16.0,
            &mut renderer,
            &RenderView::default(),
        );
        assert!(out.contains("nodes=1"));
    }

    #[test]
    fn unbound_geometry_is_never_touched() {
        let built = ScenePreset::Studio.build();
        // Bind nothing but the spinner; the sphere must stay where the
        // preset put it.
        let bindings = Bindings::resolve(&built.scene, built.spinner, None, None, None).unwrap();
        let mut scene = built.scene;
        let mut driver = FrameDriver::new(bindings);
        let sphere = built.bouncer.unwrap();
        let before = scene.get(sphere).unwrap().transform.position;

        let controls = ControlState::default();
        for frame in 0..10 {
            driver.apply_controls(&mut scene, &controls);
            driver.advance(&mut scene, &controls, frame as f64 * 16.0);
        }
        assert_eq!(scene.get(sphere).unwrap().transform.position, before);
        assert!(matches!(
            scene.mesh(sphere).unwrap().geometry,
            Geometry::Sphere { .. }
        ));
    }
}
