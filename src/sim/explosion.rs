//! Burst construction: one batch of core, shell and accent particles.

use std::f32::consts::PI;
use std::rc::Rc;

use crate::config::{ExplosionConfig, ParticleConfig};
use crate::palette::{Palette, WHITE};

use super::particle::{Particle, ParticleKind};

/// Angle of shell `i` out of `count`, evenly spaced around the circle.
pub fn shell_angle(i: usize, count: usize) -> f32 {
    if count == 0 {
        return 0.0;
    }
    PI * 2.0 * i as f32 / count as f32
}

/// Build every particle of one burst at `(x, y)`.
///
/// All particles share `palette` and `scale`; the caller appends the batch to
/// the live set in one go.
pub fn spawn_burst(
    x: f32,
    y: f32,
    palette: Rc<Palette>,
    scale: f32,
    explosion: &ExplosionConfig,
    particles: &ParticleConfig,
) -> Vec<Particle> {
    let shell_count = explosion.shell_count.sample();
    let accent_count = explosion.accent_count.sample();
    let mut batch = Vec::with_capacity(explosion.core_count + shell_count + accent_count);

    // Core: instant bloom at the centre
    for i in 0..explosion.core_count {
        let angle = PI * 2.0 / explosion.core_count as f32 * i as f32;
        let speed = fastrand::f32() * explosion.core_speed;
        batch.push(Particle::new(
            x,
            y,
            Rc::clone(&palette),
            speed,
            angle,
            ParticleKind::Core,
            scale,
            particles,
        ));
    }

    // Shell: symmetric sphere, varied speed for depth
    for i in 0..shell_count {
        let angle = shell_angle(i, shell_count);
        let speed = explosion.shell_speed.sample();
        batch.push(Particle::new(
            x,
            y,
            Rc::clone(&palette),
            speed,
            angle,
            ParticleKind::Shell,
            scale,
            particles,
        ));
    }

    // Accents: glitter overlay, some of it drooping willow
    for _ in 0..accent_count {
        let angle = fastrand::f32() * PI * 2.0;
        let speed = explosion.accent_speed.sample();
        let particle = if fastrand::f32() < explosion.willow_ratio {
            Particle::new(x, y, Rc::clone(&palette), speed, angle, ParticleKind::Willow, scale, particles)
        } else {
            Particle::new(x, y, Rc::clone(&palette), speed, angle, ParticleKind::Sparkle, scale, particles)
                .with_inner(WHITE)
        };
        batch.push(particle);
    }

    batch
}
