use serde::{Deserialize, Serialize};
use stagelight_common::Color;
use std::ops::RangeInclusive;

/// Widget range for [`ControlState::speed`].
pub const SPEED_RANGE: RangeInclusive<f32> = 0.0..=0.1;
/// Widget range for [`ControlState::angle`] (radians).
pub const ANGLE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
/// Widget range for [`ControlState::penumbra`].
pub const PENUMBRA_RANGE: RangeInclusive<f32> = 0.0..=1.0;
/// Widget range for [`ControlState::intensity`].
pub const INTENSITY_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Live-editable animation controls.
///
/// The control surface (GUI panel, CLI flags) writes these; the frame
/// driver reads them once per frame and copies them onto the bound scene
/// nodes. An explicit struct instead of a string-keyed property bag, so a
/// typo is a compile error rather than a silently dead slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    /// Material color of the bound sphere.
    pub sphere_color: Color,
    /// Draw the bound sphere as wireframe instead of filled.
    pub wireframe: bool,
    /// Phase accumulator step per frame.
    pub speed: f32,
    /// Spot light cone half-angle, radians.
    pub angle: f32,
    /// Spot light edge softness.
    pub penumbra: f32,
    /// Spot light intensity.
    pub intensity: f32,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            sphere_color: Color::hex(0xffea00),
            wireframe: false,
            speed: 0.01,
            angle: 0.2,
            penumbra: 0.0,
            intensity: 1.0,
        }
    }
}
