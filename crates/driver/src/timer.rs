use std::time::{Duration, Instant};

/// Frame timing over a sliding window.
///
/// Call [`FrameTimer::tick`] once per frame; it returns the delta since the
/// previous frame and folds it into a fixed-capacity ring buffer used for
/// the averaged FPS readout.
#[derive(Debug)]
pub struct FrameTimer {
    last: Option<Instant>,
    history: Vec<Duration>,
    capacity: usize,
    index: usize,
    filled: bool,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            last: None,
            history: vec![Duration::ZERO; capacity],
            capacity,
            index: 0,
            filled: false,
        }
    }

    /// Record the delta since the previous tick and return it.
    /// The first tick returns zero.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = match self.last {
            Some(last) => now.duration_since(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        self.record(delta);
        delta
    }

    /// Fold a frame duration into the window.
    pub fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.capacity;
        if self.index == 0 {
            self.filled = true;
        }
    }

    pub fn average(&self) -> Duration {
        let count = if self.filled { self.capacity } else { self.index };
        if count == 0 {
            return Duration::ZERO;
        }
        let total: Duration = self.history[..count].iter().sum();
        total / count as u32
    }

    /// Frames per second derived from the window average; 0.0 until at
    /// least one non-zero frame has been recorded.
    pub fn fps(&self) -> f32 {
        let avg = self.average();
        if avg.is_zero() {
            0.0
        } else {
            1.0 / avg.as_secs_f32()
        }
    }

    pub fn count(&self) -> usize {
        if self.filled { self.capacity } else { self.index }
    }
}
