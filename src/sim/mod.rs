//! Fireworks simulation: rockets, bursts, particles and the per-frame driver.
//!
//! Everything here runs in logical units on a y-down plane, one `update` per
//! simulation frame. Nothing in this module can fail.

pub mod explosion;
pub mod fireworks;
pub mod particle;
pub mod rocket;
pub mod trigger;

pub use fireworks::Fireworks;
pub use particle::{Particle, ParticleKind};
pub use rocket::Rocket;
pub use trigger::{LaunchRequest, TriggerQueue};

/// Size of the drawable area in logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center_x(&self) -> f32 {
        self.width * 0.5
    }
}
