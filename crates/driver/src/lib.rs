//! Frame driver: the per-refresh tick that animates a scene and renders it.
//!
//! # Invariants
//! - Effects within one frame happen in a fixed order: apply live controls,
//!   advance time-driven transforms, render. The render call must observe
//!   the just-updated transforms.
//! - The phase accumulator is the driver's only persistent mutable state;
//!   everything else is a function of (timestamp, controls).
//! - The frame path is infallible: bindings are validated up front.

pub mod controls;
pub mod driver;
pub mod timer;

pub use controls::ControlState;
pub use driver::{
    BOUNCE_AMPLITUDE, BindingError, Bindings, FrameDriver, SPIN_RATE, spin_angle,
};
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    "stagelight-driver v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("driver"));
    }
}
