use glam::Vec2;

/// Pointer buttons the tracker distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// A high-level camera gesture produced from raw pointer state.
///
/// The camera consumes actions, never raw input events, so the windowing
/// layer can be swapped without touching camera logic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitAction {
    /// Rotate around the target by a pointer delta.
    Orbit(Vec2),
    /// Slide the target within the view plane.
    Pan(Vec2),
    /// Move toward (positive) or away from (negative) the target,
    /// in scroll steps.
    Zoom(f32),
}

/// Accumulates pointer state between frames and turns it into actions.
///
/// Motion while the primary button is held orbits; motion while the
/// secondary button is held pans; scroll always zooms. Actions are queued
/// until [`PointerTracker::drain`] is called, once per frame.
#[derive(Debug, Default)]
pub struct PointerTracker {
    primary_held: bool,
    secondary_held: bool,
    pending: Vec<OrbitAction>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, button: PointerButton, pressed: bool) {
        match button {
            PointerButton::Primary => self.primary_held = pressed,
            PointerButton::Secondary => self.secondary_held = pressed,
        }
    }

    /// True while either drag button is held (callers typically hide the
    /// cursor during a drag).
    pub fn dragging(&self) -> bool {
        self.primary_held || self.secondary_held
    }

    /// Feed a relative pointer motion delta.
    pub fn motion(&mut self, dx: f32, dy: f32) {
        let delta = Vec2::new(dx, dy);
        if self.primary_held {
            self.pending.push(OrbitAction::Orbit(delta));
        } else if self.secondary_held {
            self.pending.push(OrbitAction::Pan(delta));
        }
    }

    /// Feed a scroll-wheel step count.
    pub fn scroll(&mut self, steps: f32) {
        if steps != 0.0 {
            self.pending.push(OrbitAction::Zoom(steps));
        }
    }

    /// Take all actions accumulated since the last drain.
    pub fn drain(&mut self) -> Vec<OrbitAction> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_without_buttons_is_ignored() {
        let mut tracker = PointerTracker::new();
        tracker.motion(3.0, 4.0);
        assert!(tracker.drain().is_empty());
        assert!(!tracker.dragging());
    }

    #[test]
    fn primary_drag_orbits() {
        let mut tracker = PointerTracker::new();
        tracker.set_button(PointerButton::Primary, true);
        tracker.motion(3.0, -2.0);
        assert_eq!(
            tracker.drain(),
            vec![OrbitAction::Orbit(Vec2::new(3.0, -2.0))]
        );
    }

    #[test]
    fn secondary_drag_pans() {
        let mut tracker = PointerTracker::new();
        tracker.set_button(PointerButton::Secondary, true);
        tracker.motion(1.0, 1.0);
        assert_eq!(tracker.drain(), vec![OrbitAction::Pan(Vec2::new(1.0, 1.0))]);
    }

    #[test]
    fn primary_wins_when_both_held() {
        let mut tracker = PointerTracker::new();
        tracker.set_button(PointerButton::Primary, true);
        tracker.set_button(PointerButton::Secondary, true);
        tracker.motion(1.0, 0.0);
        assert!(matches!(tracker.drain()[..], [OrbitAction::Orbit(_)]));
    }

    #[test]
    fn release_stops_the_gesture() {
        let mut tracker = PointerTracker::new();
        tracker.set_button(PointerButton::Primary, true);
        tracker.set_button(PointerButton::Primary, false);
        tracker.motion(5.0, 5.0);
        assert!(tracker.drain().is_empty());
    }

    #[test]
    fn scroll_zooms_regardless_of_buttons() {
        let mut tracker = PointerTracker::new();
        tracker.scroll(2.0);
        tracker.scroll(0.0);
        assert_eq!(tracker.drain(), vec![OrbitAction::Zoom(2.0)]);
    }

    #[test]
    fn drain_clears_the_queue() {
        let mut tracker = PointerTracker::new();
        tracker.scroll(1.0);
        assert_eq!(tracker.drain().len(), 1);
        assert!(tracker.drain().is_empty());
    }

    #[test]
    fn actions_keep_arrival_order() {
        let mut tracker = PointerTracker::new();
        tracker.set_button(PointerButton::Primary, true);
        tracker.motion(1.0, 0.0);
        tracker.scroll(-1.0);
        tracker.motion(0.0, 1.0);
        let actions = tracker.drain();
        assert!(matches!(
            actions[..],
            [
                OrbitAction::Orbit(_),
                OrbitAction::Zoom(_),
                OrbitAction::Orbit(_)
            ]
        ));
    }
}
