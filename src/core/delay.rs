/// Delay gate — a one-shot countdown that holds input back after a line.

/// Slack for accumulated `dt` rounding, so a wait ticked in frame-sized
/// steps ends on the frame that reaches its duration.
const TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Wait {
    duration: f32,
    elapsed: f32,
}

#[derive(Debug, Clone, Default)]
pub struct DelayGate {
    wait: Option<Wait>,
}

impl DelayGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start waiting `seconds`. A running wait is replaced, not extended.
    /// Non-positive durations leave the gate open.
    pub fn start(&mut self, seconds: f32) {
        self.wait = (seconds > 0.0).then_some(Wait {
            duration: seconds,
            elapsed: 0.0,
        });
    }

    /// Advance by `dt`. Returns true on the tick the wait ends.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(wait) = self.wait.as_mut() else {
            return false;
        };
        wait.elapsed += dt;
        if wait.elapsed + TOLERANCE >= wait.duration {
            self.wait = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.wait = None;
    }

    pub fn is_waiting(&self) -> bool {
        self.wait.is_some()
    }

    pub fn remaining(&self) -> f32 {
        self.wait
            .map_or(0.0, |w| (w.duration - w.elapsed).max(0.0))
    }
}
