use glam::Vec3;
use stagelight_common::{Color, NodeId, Transform};

use crate::graph::SceneGraph;
use crate::node::{Fog, Geometry, HelperNode, LightNode, Material, MeshNode};

/// The built-in demo scenes, ordered from bare to fully dressed.
/// Variant order is the dressing order; comparisons rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScenePreset {
    /// Axis tripod only.
    Axes,
    /// Axes plus a spinning unlit green box.
    SpinningBox,
    /// Adds the ground plane, grid, and the control-driven bouncing sphere.
    BouncingSphere,
    /// The full stage: lights, spot cone helper, fog, shadows.
    Studio,
}

impl ScenePreset {
    pub const ALL: [Self; 4] = [
        Self::Axes,
        Self::SpinningBox,
        Self::BouncingSphere,
        Self::Studio,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Axes => "axes",
            Self::SpinningBox => "spinning-box",
            Self::BouncingSphere => "bouncing-sphere",
            Self::Studio => "studio",
        }
    }

    /// Build the preset scene and report which nodes a frame driver should
    /// animate.
    pub fn build(&self) -> PresetScene {
        let mut scene = SceneGraph::new();
        let mut built = PresetSceneIds::default();
        let mut eye = Vec3::new(0.0, 0.0, 3.0);

        let axes_length = if *self == Self::Axes { 3.0 } else { 5.0 };
        scene.add_helper(
            "axes",
            Transform::default(),
            HelperNode::Axes { length: axes_length },
        );

        if *self >= Self::SpinningBox {
            eye = Vec3::new(0.0, 2.0, 5.0);
            built.spinner = Some(scene.add_mesh(
                "box",
                Transform::default(),
                MeshNode::new(
                    Geometry::Cuboid { size: Vec3::ONE },
                    Material::basic(Color::hex(0x00ff00)),
                ),
            ));
        }

        if *self >= Self::BouncingSphere {
            eye = Vec3::new(-10.0, 30.0, 30.0);
            scene.add_mesh(
                "plane",
                Transform::default(),
                MeshNode::new(
                    Geometry::Plane {
                        width: 30.0,
                        depth: 30.0,
                    },
                    Material::lit(Color::WHITE),
                )
                .with_receive_shadow(),
            );
            scene.add_helper(
                "grid",
                Transform::default(),
                HelperNode::GridFloor {
                    size: 30.0,
                    divisions: 10,
                },
            );
            built.bouncer = Some(scene.add_mesh(
                "sphere",
                Transform::at(Vec3::new(-10.0, 10.0, 0.0)),
                MeshNode::new(
                    Geometry::Sphere { radius: 4.0 },
                    Material::lit(Color::hex(0x0000ff)),
                )
                .with_cast_shadow(),
            ));
        }

        if *self >= Self::Studio {
            scene.add_light(
                "ambient",
                Transform::default(),
                LightNode::Ambient {
                    color: Color::hex(0x333333),
                    intensity: 1.0,
                },
            );
            let spot = scene.add_light(
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
                    light: spot,
                    angle: 0.0,
                    range: 0.0,
                },
            );
            scene.refresh_spot_cone(cone);
            built.spot = Some(spot);
            built.cone = Some(cone);

            scene.background = Color::hex(0xfefefe);
            scene.fog = Some(Fog::Linear {
                color: Color::WHITE,
                near: 0.0,
                far: 200.0,
            });
            scene.shadows = true;
        }

        tracing::debug!(preset = self.name(), nodes = scene.len(), "built preset scene");

        PresetScene {
            scene,
            spinner: built.spinner,
            bouncer: built.bouncer,
            spot: built.spot,
            cone: built.cone,
            eye,
        }
    }
}

impl std::fmt::Display for ScenePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ScenePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "axes" => Ok(Self::Axes),
            "spinning-box" => Ok(Self::SpinningBox),
            "bouncing-sphere" => Ok(Self::BouncingSphere),
            "studio" => Ok(Self::Studio),
            other => Err(format!(
                "unknown preset '{other}' (expected one of: axes, spinning-box, bouncing-sphere, studio)"
            )),
        }
    }
}

#[derive(Default)]
struct PresetSceneIds {
    spinner: Option<NodeId>,
    bouncer: Option<NodeId>,
    spot: Option<NodeId>,
    cone: Option<NodeId>,
}

/// A built preset: the scene plus the node ids a driver animates and a
/// suggested camera eye position.
pub struct PresetScene {
    pub scene: SceneGraph,
    /// Mesh whose rotation tracks the frame timestamp.
    pub spinner: Option<NodeId>,
    /// Mesh bounced by the phase accumulator.
    pub bouncer: Option<NodeId>,
    /// Spot light driven by the control surface.
    pub spot: Option<NodeId>,
    /// Cone helper refreshed after the spot light changes.
    pub cone: Option<NodeId>,
    /// Suggested camera position, looking at the origin.
    pub eye: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn axes_preset_is_minimal() {
        let built = ScenePreset::Axes.build();
        assert_eq!(built.scene.len(), 1);
        assert!(built.spinner.is_none());
        assert!(built.bouncer.is_none());
        assert!(built.scene.fog.is_none());
        assert!(!built.scene.shadows);
    }

    #[test]
    fn spinning_box_exposes_spinner() {
        let built = ScenePreset::SpinningBox.build();
        let spinner = built.spinner.expect("spinner id");
        let mesh = built.scene.mesh(spinner).expect("spinner mesh");
        assert!(matches!(mesh.geometry, Geometry::Cuboid { .. }));
        assert!(!mesh.material.lit);
    }

    #[test]
    fn bouncing_sphere_starts_at_rest_height() {
        let built = ScenePreset::BouncingSphere.build();
        let bouncer = built.bouncer.expect("bouncer id");
        let node = built.scene.get(bouncer).unwrap();
        assert_eq!(node.transform.position, Vec3::new(-10.0, 10.0, 0.0));
        assert!(built.scene.mesh(bouncer).unwrap().cast_shadow);
    }

    #[test]
    fn studio_enables_the_extras() {
        let built = ScenePreset::Studio.build();
        assert!(built.scene.shadows);
        assert!(matches!(built.scene.fog, Some(Fog::Linear { .. })));

        let spot = built.spot.expect("spot id");
        assert!(matches!(
            built.scene.light(spot),
            Some(LightNode::Spot { angle, .. }) if *angle == 0.2
        ));

        // The cone helper was refreshed at build time.
        let cone = built.cone.expect("cone id");
        let Some(&HelperNode::SpotCone { angle, range, .. }) = built.scene.helper(cone) else {
            panic!("cone helper missing");
        };
        assert_eq!(angle, 0.2);
        assert!(range > 100.0);
    }

    #[test]
    fn studio_counts_by_kind() {
        let built = ScenePreset::Studio.build();
        let lights = built
            .scene
            .nodes()
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Light(_)))
            .count();
        assert_eq!(lights, 2);
        // axes + grid + cone
        let helpers = built
            .scene
            .nodes()
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Helper(_)))
            .count();
        assert_eq!(helpers, 3);
    }

    #[test]
    fn preset_names_round_trip() {
        for preset in ScenePreset::ALL {
            let parsed: ScenePreset = preset.name().parse().unwrap();
            assert_eq!(parsed, preset);
        }
        assert!("nope".parse::<ScenePreset>().is_err());
    }
}
