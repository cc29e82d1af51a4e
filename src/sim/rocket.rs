use std::collections::VecDeque;

use crate::canvas::{circle, segment, Canvas, ColorStop, Paint, Rgba};
use crate::config::{AscentPolicy, RocketConfig};
use crate::palette::Rgb;

const HEAD_RADIUS: f32 = 4.0;
const GLOW_RADIUS: f32 = 15.0;
const TRAIL_WIDTH: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrailPoint {
    x: f32,
    y: f32,
    alpha: f32,
}

/// A shell climbing toward its burst height.
#[derive(Debug, Clone)]
pub struct Rocket {
    x: f32,
    y: f32,
    start_y: f32,
    target_y: f32,
    ascent: AscentPolicy,
    color: Rgb,
    trail: VecDeque<TrailPoint>,
    trail_cap: usize,
    trail_decay: f32,
    jitter: f32,
    tolerance: f32,
    exploded: bool,
    palette_index: Option<usize>,
    scale: f32,
}

impl Rocket {
    pub fn new(
        x: f32,
        start_y: f32,
        target_y: f32,
        palette_index: Option<usize>,
        scale: f32,
        config: &RocketConfig,
    ) -> Self {
        Self {
            x,
            y: start_y,
            start_y,
            target_y,
            ascent: config.ascent,
            color: config.color,
            trail: VecDeque::with_capacity(config.trail_len + 1),
            trail_cap: config.trail_len,
            trail_decay: config.trail_decay,
            jitter: config.jitter,
            tolerance: config.tolerance,
            exploded: false,
            palette_index,
            scale,
        }
    }

    /// Climb one frame. After the burst this is a no-op.
    pub fn update(&mut self) {
        if self.exploded {
            return;
        }

        let step = match self.ascent {
            AscentPolicy::Constant { speed } => speed,
            AscentPolicy::Eased { damping, min_speed } => {
                ((self.y - self.target_y).max(0.0) * damping).max(min_speed)
            }
        };
        self.y -= step;

        let wobble = (fastrand::f32() - 0.5) * self.jitter;
        self.trail.push_back(TrailPoint {
            x: self.x + wobble,
            y: self.y,
            alpha: 1.0,
        });
        while self.trail.len() > self.trail_cap {
            self.trail.pop_front();
        }
        for point in &mut self.trail {
            point.alpha *= self.trail_decay;
        }

        if self.y <= self.target_y + self.tolerance {
            // Burst exactly at the requested height
            if self.y < self.target_y {
                self.y = self.target_y;
            }
            self.exploded = true;
        }
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        canvas.save();
        canvas.set_global_alpha(1.0);

        for (t1, t2) in self.trail.iter().zip(self.trail.iter().skip(1)) {
            let paint = Paint::Solid(Rgba::from_rgb(self.color, t1.alpha * 0.5));
            canvas.stroke_path(&segment((t1.x, t1.y), (t2.x, t2.y)), &paint, TRAIL_WIDTH);
        }

        let head = circle(self.x, self.y, HEAD_RADIUS);
        canvas.fill_path(&head, &Paint::Solid(Rgba::from_rgb(self.color, 1.0)));

        let glow = circle(self.x, self.y, HEAD_RADIUS + GLOW_RADIUS);
        let glow_paint = Paint::Radial {
            focus: (self.x, self.y),
            center: (self.x, self.y),
            radius: HEAD_RADIUS + GLOW_RADIUS,
            stops: vec![
                ColorStop::new(0.0, Rgba::from_rgb(self.color, 0.6)),
                ColorStop::new(HEAD_RADIUS / (HEAD_RADIUS + GLOW_RADIUS), Rgba::from_rgb(self.color, 0.35)),
                ColorStop::new(1.0, Rgba::TRANSPARENT),
            ],
        };
        canvas.fill_path(&glow, &glow_paint);

        canvas.restore();
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn start_y(&self) -> f32 {
        self.start_y
    }

    pub fn target_y(&self) -> f32 {
        self.target_y
    }

    pub fn exploded(&self) -> bool {
        self.exploded
    }

    pub fn palette_index(&self) -> Option<usize> {
        self.palette_index
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rocket(start_y: f32, target_y: f32, ascent: AscentPolicy) -> Rocket {
        let config = RocketConfig {
            ascent,
            ..RocketConfig::default()
        };
        Rocket::new(100.0, start_y, target_y, None, 1.0, &config)
    }

    #[test]
    fn climbs_at_constant_speed() {
        let mut r = rocket(600.0, 50.0, AscentPolicy::Constant { speed: 12.0 });
        r.update();
        assert_eq!(r.y(), 588.0);
        assert!(!r.exploded());
    }

    #[test]
    fn explodes_once_at_target() {
        let mut r = rocket(600.0, 50.0, AscentPolicy::default());
        let mut transitions = 0;
        let mut was_exploded = false;
        for _ in 0..200 {
            r.update();
            if r.exploded() && !was_exploded {
                transitions += 1;
            }
            assert!(!was_exploded || r.exploded(), "exploded must never reset");
            was_exploded = r.exploded();
        }
        assert_eq!(transitions, 1);
        assert_eq!(r.y(), 50.0);
    }

    #[test]
    fn target_below_start_explodes_immediately() {
        let mut r = rocket(600.0, 700.0, AscentPolicy::default());
        r.update();
        assert!(r.exploded());
        let mut same = rocket(600.0, 600.0, AscentPolicy::default());
        same.update();
        assert!(same.exploded());
    }

    #[test]
    fn eased_ascent_slows_near_target() {
        let mut r = rocket(600.0, 100.0, AscentPolicy::Eased { damping: 0.05, min_speed: 2.0 });
        let mut last_y = r.y();
        let mut steps = Vec::new();
        while !r.exploded() {
            r.update();
            steps.push(last_y - r.y());
            last_y = r.y();
            assert!(steps.len() < 1000, "eased rocket never arrived");
        }
        assert!(steps[0] > steps[steps.len() / 2]);
        assert!(steps.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn trail_is_capped_and_fading() {
        let mut r = rocket(2000.0, 0.0, AscentPolicy::Constant { speed: 5.0 });
        for _ in 0..50 {
            r.update();
            assert!(r.trail_len() <= 20);
        }
        assert_eq!(r.trail_len(), 20);
        let alphas: Vec<f32> = r.trail.iter().map(|t| t.alpha).collect();
        assert!(alphas.windows(2).all(|w| w[0] < w[1]), "older points must be dimmer");
        assert!((alphas[19] - 0.85).abs() < 1e-6);
    }

    #[test]
    fn draw_lights_the_head() {
        let mut canvas = Canvas::new(60, 60, 4.0);
        let mut r = rocket(200.0, 20.0, AscentPolicy::default());
        r.update();
        r.draw(&mut canvas);
        let (px, py) = ((r.x() / 4.0) as usize, (r.y() / 4.0) as usize);
        assert!(canvas.pixel(px, py)[3] > 0.5);
    }
}
