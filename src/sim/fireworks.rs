use std::rc::Rc;

use crate::canvas::{Canvas, Composite, Rgba};
use crate::config::{ExplosionConfig, ParticleConfig, RocketConfig, ShowConfig};
use crate::events::{EventSink, ShowEvent};
use crate::palette::Palette;

use super::explosion::spawn_burst;
use super::particle::Particle;
use super::rocket::Rocket;
use super::trigger::{LaunchRequest, TriggerQueue};
use super::Viewport;

/// Owner of every live rocket and particle; advances and paints them once per
/// frame.
pub struct Fireworks {
    viewport: Viewport,
    rockets: Vec<Rocket>,
    particles: Vec<Particle>,
    palettes: Vec<Rc<Palette>>,
    rocket_config: RocketConfig,
    explosion_config: ExplosionConfig,
    particle_config: ParticleConfig,
    fade_alpha: f32,
}

impl Fireworks {
    pub fn new(viewport: Viewport, config: &ShowConfig) -> Self {
        let mut palettes: Vec<Rc<Palette>> = config.palettes.iter().copied().map(Rc::new).collect();
        if palettes.is_empty() {
            palettes.push(Rc::new(Palette::MYSTIC_BLUE));
        }

        Self {
            viewport,
            rockets: Vec::new(),
            particles: Vec::with_capacity(1024),
            palettes,
            rocket_config: config.rocket.clone(),
            explosion_config: config.explosion.clone(),
            particle_config: config.particles.clone(),
            fade_alpha: config.fade_alpha,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// New launch geometry only; live entities keep their coordinates.
    pub fn resize(&mut self, viewport: Viewport) {
        log::debug!(
            "fireworks viewport {}x{} -> {}x{}",
            self.viewport.width,
            self.viewport.height,
            viewport.width,
            viewport.height
        );
        self.viewport = viewport;
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Turn every pending request into a rocket, in order, and empty the
    /// queue. Returns how many rockets were launched.
    pub fn consume(&mut self, queue: &mut TriggerQueue, sink: &mut dyn EventSink) -> usize {
        if queue.is_empty() {
            return 0;
        }
        let requests = queue.drain();
        let launched = requests.len();
        for request in requests {
            self.launch(request, sink);
        }
        launched
    }

    pub fn launch(&mut self, request: LaunchRequest, sink: &mut dyn EventSink) {
        sink.emit(ShowEvent::Launch);

        let ceiling = self.viewport.height * (1.0 - self.rocket_config.min_altitude_fraction);
        let target_y = request.y.min(ceiling);
        log::debug!("launch x={:.1} target_y={:.1}", request.x, target_y);

        self.rockets.push(Rocket::new(
            request.x,
            self.viewport.height,
            target_y,
            request.palette_index,
            request.scale.unwrap_or(1.0),
            &self.rocket_config,
        ));
    }

    /// One frame: fade, then rockets, then particles (including any spawned
    /// by this frame's bursts). Without a canvas the simulation still runs.
    pub fn tick(&mut self, mut canvas: Option<&mut Canvas>, sink: &mut dyn EventSink) {
        if let Some(c) = canvas.as_deref_mut() {
            c.set_composite(Composite::DestinationOut);
            c.set_global_alpha(1.0);
            c.fill_all(Rgba {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: self.fade_alpha,
            });
            c.set_composite(Composite::Lighter);
        }

        for rocket in &mut self.rockets {
            rocket.update();
            if let Some(c) = canvas.as_deref_mut() {
                rocket.draw(c);
            }
            if rocket.exploded() {
                let palette = pick_palette(&self.palettes, rocket.palette_index());
                sink.emit(ShowEvent::Explosion);
                log::debug!("burst at ({:.1}, {:.1}) scale {}", rocket.x(), rocket.y(), rocket.scale());
                self.particles.extend(spawn_burst(
                    rocket.x(),
                    rocket.y(),
                    palette,
                    rocket.scale(),
                    &self.explosion_config,
                    &self.particle_config,
                ));
            }
        }
        self.rockets.retain(|r| !r.exploded());

        for particle in &mut self.particles {
            particle.update();
            if let Some(c) = canvas.as_deref_mut() {
                particle.draw(c);
            }
        }
        self.particles.retain(Particle::is_alive);
    }
}

fn pick_palette(palettes: &[Rc<Palette>], index: Option<usize>) -> Rc<Palette> {
    let i = match index {
        Some(i) => i % palettes.len(),
        None => fastrand::usize(..palettes.len()),
    };
    Rc::clone(&palettes[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show_config() -> ShowConfig {
        ShowConfig {
            palettes: vec![
                Palette::MYSTIC_BLUE,
                Palette { inner: (255, 0, 128), halo: (128, 0, 64) },
            ],
            ..ShowConfig::default()
        }
    }

    fn fireworks() -> Fireworks {
        Fireworks::new(Viewport::new(800.0, 600.0), &show_config())
    }

    // No altitude floor, so a target at ground level bursts on the first tick
    fn grounded_fireworks() -> Fireworks {
        let mut config = show_config();
        config.rocket.min_altitude_fraction = 0.0;
        Fireworks::new(Viewport::new(800.0, 600.0), &config)
    }

    #[test]
    fn empty_queue_is_a_no_op() {
        let mut fw = fireworks();
        let mut queue = TriggerQueue::new();
        let mut events = Vec::new();
        assert_eq!(fw.consume(&mut queue, &mut events), 0);
        assert_eq!(fw.consume(&mut queue, &mut events), 0);
        assert!(fw.rockets().is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn batch_launches_in_request_order() {
        let mut fw = fireworks();
        let mut queue = TriggerQueue::new();
        for i in 0..5 {
            queue.push(LaunchRequest::at(100.0 * (i + 1) as f32, 80.0));
        }
        let mut events = Vec::new();
        assert_eq!(fw.consume(&mut queue, &mut events), 5);
        assert!(queue.is_empty());
        let xs: Vec<f32> = fw.rockets().iter().map(Rocket::x).collect();
        assert_eq!(xs, vec![100.0, 200.0, 300.0, 400.0, 500.0]);
        assert_eq!(events, vec![ShowEvent::Launch; 5]);
        assert!(fw.rockets().iter().all(|r| r.start_y() == 600.0));
    }

    #[test]
    fn low_targets_are_lifted_to_min_altitude() {
        let mut fw = fireworks();
        fw.launch(LaunchRequest::at(10.0, 590.0), &mut Vec::new());
        assert!((fw.rockets()[0].target_y() - 540.0).abs() < 1e-3);
    }

    #[test]
    fn burst_particles_update_in_the_same_frame() {
        let mut fw = grounded_fireworks();
        fw.launch(LaunchRequest::at(400.0, 600.0).with_scale(1.0), &mut Vec::new());
        let mut events = Vec::new();
        fw.tick(None, &mut events);
        assert!(fw.rockets().is_empty());
        assert!(!fw.particles().is_empty());
        assert!(fw.particles().iter().all(|p| p.age() == 1));
        assert_eq!(events, vec![ShowEvent::Explosion]);
    }

    #[test]
    fn palette_index_wraps() {
        let mut fw = grounded_fireworks();
        fw.launch(LaunchRequest::at(400.0, 600.0).with_palette(3), &mut Vec::new());
        fw.tick(None, &mut Vec::new());
        assert!(fw.particles().iter().all(|p| p.halo() == (128, 0, 64)));
    }

    #[test]
    fn dead_particles_are_removed() {
        let mut fw = grounded_fireworks();
        fw.launch(LaunchRequest::at(400.0, 600.0), &mut Vec::new());
        for _ in 0..400 {
            fw.tick(None, &mut Vec::new());
        }
        assert!(fw.particles().is_empty());
    }

    #[test]
    fn tick_paints_and_leaves_lighter_mode() {
        let mut fw = fireworks();
        let mut canvas = Canvas::new(200, 150, 4.0);
        fw.launch(LaunchRequest::at(400.0, 100.0), &mut Vec::new());
        fw.tick(Some(&mut canvas), &mut Vec::new());
        assert_eq!(canvas.composite(), Composite::Lighter);
        let lit = (0..150).any(|y| (0..200).any(|x| canvas.pixel(x, y)[3] > 0.0));
        assert!(lit);
    }

    #[test]
    fn resize_keeps_live_entities() {
        let mut fw = fireworks();
        fw.launch(LaunchRequest::at(700.0, 100.0), &mut Vec::new());
        fw.tick(None, &mut Vec::new());
        let before = fw.rockets()[0].y();
        fw.resize(Viewport::new(300.0, 200.0));
        assert_eq!(fw.rockets()[0].x(), 700.0);
        assert_eq!(fw.rockets()[0].y(), before);
        assert_eq!(fw.viewport(), Viewport::new(300.0, 200.0));
    }
}
