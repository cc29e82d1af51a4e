use crate::config::Span;
use crate::sim::{LaunchRequest, Viewport};

use super::random_launch;

/// Fires random launches at random intervals.
pub struct AutoLauncher {
    time: f32,
    next_launch: f32,
    interval: Span,
}

impl AutoLauncher {
    pub fn new(interval: Span) -> Self {
        Self {
            time: 0.0,
            next_launch: 0.5,
            interval,
        }
    }

    /// Advance the clock by `dt` seconds; yields a request when one is due.
    pub fn update(&mut self, dt: f32, viewport: Viewport) -> Option<LaunchRequest> {
        self.time += dt;
        // Wrap time to prevent floating point precision issues
        if self.time > 10000.0 {
            self.time -= 10000.0;
            self.next_launch -= 10000.0;
        }

        if self.time < self.next_launch {
            return None;
        }
        self.next_launch = self.time + self.interval.sample();
        Some(random_launch(viewport))
    }
}
