use serde::{Deserialize, Serialize};
use stagelight_common::{Color, NodeId};

/// Parametric geometry for a mesh node. All primitives are centered on the
/// node origin; the plane lies flat in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Cuboid { size: glam::Vec3 },
    Sphere { radius: f32 },
    Plane { width: f32, depth: f32 },
}

/// Surface appearance of a mesh node.
///
/// `lit: false` means the surface ignores lights entirely and is drawn with
/// its raw color; `wireframe` swaps the fill for the geometry's edge lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    pub wireframe: bool,
    pub lit: bool,
}

impl Material {
    /// Unlit single-color material.
    pub fn basic(color: Color) -> Self {
        Self {
            color,
            wireframe: false,
            lit: false,
        }
    }

    /// Light-responding material.
    pub fn lit(color: Color) -> Self {
        Self {
            color,
            wireframe: false,
            lit: true,
        }
    }
}

/// A renderable surface: geometry plus material plus shadow participation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub geometry: Geometry,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshNode {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_cast_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    pub fn with_receive_shadow(mut self) -> Self {
        self.receive_shadow = true;
        self
    }
}

/// A light source. Position and orientation come from the node transform;
/// spot lights aim at the world origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightNode {
    Ambient {
        color: Color,
        intensity: f32,
    },
    Directional {
        color: Color,
        intensity: f32,
        cast_shadow: bool,
        /// Half-extent of the orthographic shadow volume.
        shadow_extent: f32,
    },
    Spot {
        color: Color,
        intensity: f32,
        /// Half-angle of the cone, in radians.
        angle: f32,
        /// Edge softness in [0, 1]: fraction of the cone that fades out.
        penumbra: f32,
        cast_shadow: bool,
    },
}

impl LightNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Ambient { .. } => "ambient",
            Self::Directional { .. } => "directional",
            Self::Spot { .. } => "spot",
        }
    }
}

/// Non-renderable debug visuals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HelperNode {
    /// RGB axis tripod of the given arm length at the node origin.
    Axes { length: f32 },
    /// Square line grid in the XZ plane.
    GridFloor { size: f32, divisions: u32 },
    /// Cone outline visualizing a spot light. `angle` and `range` are a
    /// snapshot of the light's parameters, re-copied on refresh.
    SpotCone {
        light: NodeId,
        angle: f32,
        range: f32,
    },
}

/// Distance fog applied by renderers that support it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Fog {
    Linear { color: Color, near: f32, far: f32 },
    Exp2 { color: Color, density: f32 },
}

/// What a scene node actually is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Mesh(MeshNode),
    Light(LightNode),
    Helper(HelperNode),
}

impl NodeKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Mesh(_) => "mesh",
            Self::Light(light) => light.kind_name(),
            Self::Helper(HelperNode::Axes { .. }) => "axes",
            Self::Helper(HelperNode::GridFloor { .. }) => "grid",
            Self::Helper(HelperNode::SpotCone { .. }) => "spot-cone",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_material_is_unlit() {
        let m = Material::basic(Color::hex(0x00ff00));
        assert!(!m.lit);
        assert!(!m.wireframe);
    }

    #[test]
    fn mesh_shadow_flags_default_off() {
        let mesh = MeshNode::new(
            Geometry::Sphere { radius: 4.0 },
            Material::lit(Color::hex(0x0000ff)),
        );
        assert!(!mesh.cast_shadow);
        assert!(!mesh.receive_shadow);
        assert!(mesh.with_cast_shadow().cast_shadow);
    }

    #[test]
    fn light_kind_names() {
        let spot = LightNode::Spot {
            color: Color::WHITE,
            intensity: 1.0,
            angle: 0.2,
            penumbra: 0.0,
            cast_shadow: true,
        };
        assert_eq!(spot.kind_name(), "spot");
        assert_eq!(NodeKind::Light(spot).kind_name(), "spot");
    }
}
