use glam::{Mat4, Vec3};
use stagelight_render::RenderView;

const MIN_PITCH: f32 = -1.54;
const MAX_PITCH: f32 = 1.54;
const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 500.0;

/// Orbit camera: yaw/pitch/distance around a target point.
/// Camera motion is NOT deterministic ... it exists outside the driver boundary.
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let mut cam = Self {
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            distance: 10.0,
            fov_y: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            rotate_speed: 0.005,
            pan_speed: 0.002,
        };
        cam.look_from(Vec3::new(-10.0, 30.0, 30.0));
        cam
    }
}

impl OrbitCamera {
    /// Rederive yaw, pitch, and distance so the camera sits at `eye`
    /// looking at the current target. This is the refresh entry point for
    /// programmatic camera moves made outside the frame loop.
    pub fn look_from(&mut self, eye: Vec3) {
        let offset = eye - self.target;
        let distance = offset.length();
        if distance < f32::EPSILON {
            return;
        }
        self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.pitch = (offset.y / distance).asin().clamp(MIN_PITCH, MAX_PITCH);
        self.yaw = offset.z.atan2(offset.x);
    }

    /// Current camera position in world space.
    pub fn position(&self) -> Vec3 {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.cos(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.sin(),
        ) * self.distance;
        self.target + offset
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position()).normalize()
    }

    /// Rotate around the target by a pointer delta.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.rotate_speed;
        self.pitch = (self.pitch + dy * self.rotate_speed).clamp(MIN_PITCH, MAX_PITCH);
    }

    /// Slide the target within the view plane. Pan distance scales with
    /// orbit distance so the gesture feels constant on screen.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = self.forward();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);
        let scale = self.pan_speed * self.distance;
        self.target += (-right * dx + up * dy) * scale;
    }

    /// Move toward (positive steps) or away from the target.
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance * 0.9_f32.powf(steps)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Snapshot for the renderer seam.
    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.position(),
            target: self.target,
            fov_y: self.fov_y,
            aspect: self.aspect,
            near: self.near,
            far: self.far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_is_valid() {
        let cam = OrbitCamera::default();
        assert!(cam.position().y > 0.0);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn look_from_round_trips_position() {
        let mut cam = OrbitCamera::default();
        let eye = Vec3::new(-10.0, 30.0, 30.0);
        cam.look_from(eye);
        assert!(cam.position().abs_diff_eq(eye, 1e-3));
    }

    #[test]
    fn orbit_moves_position_but_not_target() {
        let mut cam = OrbitCamera::default();
        let start = cam.position();
        cam.orbit(40.0, 15.0);
        assert_ne!(cam.position(), start);
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn pitch_stays_off_the_poles() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, 10_000.0);
        assert!(cam.pitch <= MAX_PITCH);
        cam.orbit(0.0, -100_000.0);
        assert!(cam.pitch >= MIN_PITCH);
    }

    #[test]
    fn zoom_clamps_distance() {
        let mut cam = OrbitCamera::default();
        cam.zoom(1_000.0);
        assert_eq!(cam.distance, MIN_DISTANCE);
        cam.zoom(-1_000.0);
        assert_eq!(cam.distance, MAX_DISTANCE);
    }

    #[test]
    fn pan_moves_the_target() {
        let mut cam = OrbitCamera::default();
        cam.pan(10.0, 0.0);
        assert_ne!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn render_view_reflects_camera() {
        let cam = OrbitCamera::default();
        let view = cam.render_view();
        assert!(view.eye.abs_diff_eq(cam.position(), 1e-6));
        assert_eq!(view.fov_y, cam.fov_y);
    }
}
