use std::collections::VecDeque;
use std::rc::Rc;

use crate::canvas::{point, Canvas, ColorStop, Paint, Path, Rgba};
use crate::config::ParticleConfig;
use crate::palette::{Palette, Rgb, WHITE};

// Trail points are only recorded while the particle is still visible.
const TRAIL_ALPHA_FLOOR: f32 = 0.05;
const MIN_DRAW_SIZE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Core,    // Slow centre cluster, blooms immediately
    Shell,   // Main sphere, delayed bloom with comet trail
    Sparkle, // White glitter
    Willow,  // Long-lived, light gravity
}

/// One spark of a burst.
#[derive(Debug, Clone)]
pub struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    angle: f32,
    age: u32,
    life: f32,
    max_life: f32,
    bloom_delay: f32,
    current_size: f32,
    target_size: f32,
    alpha: f32,
    friction: f32,
    gravity: f32,
    jitter: f32,
    bloom_rate: f32,
    trail: VecDeque<(f32, f32)>,
    trail_cap: usize,
    palette: Rc<Palette>,
    inner_override: Option<Rgb>,
    kind: ParticleKind,
}

impl Particle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x: f32,
        y: f32,
        palette: Rc<Palette>,
        speed: f32,
        angle: f32,
        kind: ParticleKind,
        scale: f32,
        config: &ParticleConfig,
    ) -> Self {
        let tuning = config.tuning(kind);

        // Bigger bursts throw their shells proportionally further
        let speed_mult = if kind == ParticleKind::Shell {
            scale * 0.8 + 0.2
        } else {
            1.0
        };
        let life = tuning.life.sample();

        Self {
            x,
            y,
            vx: angle.cos() * speed * speed_mult,
            vy: angle.sin() * speed * speed_mult,
            angle,
            age: 0,
            life,
            max_life: life,
            bloom_delay: tuning.bloom_delay.sample(),
            current_size: 0.0,
            target_size: tuning.base_size * scale,
            alpha: 1.0,
            friction: tuning.friction,
            gravity: tuning.gravity,
            jitter: config.shell_jitter,
            bloom_rate: config.bloom_rate,
            trail: VecDeque::with_capacity(tuning.trail_len + 1),
            trail_cap: tuning.trail_len,
            palette,
            inner_override: None,
            kind,
        }
    }

    /// Replace the palette's inner colour for this particle only.
    pub fn with_inner(mut self, inner: Rgb) -> Self {
        self.inner_override = Some(inner);
        self
    }

    pub fn update(&mut self) {
        self.age += 1;

        // Turbulence
        if self.kind == ParticleKind::Shell {
            self.vx += (fastrand::f32() - 0.5) * self.jitter;
            self.vy += (fastrand::f32() - 0.5) * self.jitter;
        }

        self.vx *= self.friction;
        self.vy *= self.friction;
        self.vy += self.gravity;

        self.x += self.vx;
        self.y += self.vy;

        // Exponential approach gives the bloom its "pop"
        if self.age as f32 >= self.bloom_delay && self.current_size < self.target_size {
            self.current_size += (self.target_size - self.current_size) * self.bloom_rate;
        }

        self.life -= 1.0;
        self.alpha = (self.life / self.max_life).max(0.0);

        if self.alpha > TRAIL_ALPHA_FLOOR {
            self.trail.push_back((self.x, self.y));
            while self.trail.len() > self.trail_cap {
                self.trail.pop_front();
            }
        }
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        canvas.save();

        if self.kind == ParticleKind::Shell && self.trail.len() > 2 {
            self.draw_trail(canvas);
        }

        if self.current_size > MIN_DRAW_SIZE {
            self.draw_heart(canvas);
        }

        canvas.restore();
    }

    // Comet streak: midpoint-smoothed curve through the trail history.
    fn draw_trail(&self, canvas: &mut Canvas) {
        let first = self.trail[0];
        let mut builder = Path::builder();
        builder.begin(point(first.0, first.1));
        for (p0, p1) in self.trail.iter().zip(self.trail.iter().skip(1)) {
            let mid = point((p0.0 + p1.0) / 2.0, (p0.1 + p1.1) / 2.0);
            builder.quadratic_bezier_to(point(p0.0, p0.1), mid);
        }
        builder.line_to(point(self.x, self.y));
        builder.end(false);
        let path = builder.build();

        let paint = Paint::Linear {
            from: first,
            to: (self.x, self.y),
            stops: vec![
                ColorStop::new(0.0, Rgba::TRANSPARENT),
                ColorStop::new(0.2, Rgba::from_rgb(self.halo(), 0.2)),
                ColorStop::new(1.0, Rgba::from_rgb(self.inner(), 1.0)),
            ],
        };
        canvas.set_global_alpha(self.alpha * 0.8);
        canvas.stroke_path(&path, &paint, (self.target_size * 0.2).max(1.0));
    }

    // Neon outline: halo glow, inner tube, white highlight over a rim-bright fill.
    fn draw_heart(&self, canvas: &mut Canvas) {
        let s = self.current_size;
        let path = heart_path(self.x, self.y, s);

        let fill = Paint::Radial {
            focus: (self.x, self.y - s * 0.2),
            center: (self.x, self.y),
            radius: s * 1.4,
            stops: vec![
                ColorStop::new(0.0, Rgba::from_rgb(WHITE, 0.05)),
                ColorStop::new(0.6, Rgba::from_rgb(WHITE, 0.15)),
                ColorStop::new(1.0, Rgba::from_rgb(WHITE, 0.5)),
            ],
        };
        canvas.set_global_alpha(self.alpha);
        canvas.fill_path(&path, &fill);

        canvas.set_global_alpha(self.alpha * 0.3);
        canvas.stroke_path(&path, &Paint::Solid(Rgba::from_rgb(self.halo(), 1.0)), s * 0.25);

        canvas.set_global_alpha(self.alpha);
        canvas.stroke_path(&path, &Paint::Solid(Rgba::from_rgb(self.inner(), 1.0)), s * 0.1);

        canvas.set_global_alpha(self.alpha * 0.9);
        canvas.stroke_path(&path, &Paint::Solid(Rgba::from_rgb(WHITE, 1.0)), s * 0.03);
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.vx, self.vy)
    }

    /// Launch direction in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn life(&self) -> f32 {
        self.life
    }

    pub fn max_life(&self) -> f32 {
        self.max_life
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn bloom_delay(&self) -> f32 {
        self.bloom_delay
    }

    pub fn current_size(&self) -> f32 {
        self.current_size
    }

    pub fn target_size(&self) -> f32 {
        self.target_size
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn palette(&self) -> &Rc<Palette> {
        &self.palette
    }

    pub fn inner(&self) -> Rgb {
        self.inner_override.unwrap_or(self.palette.inner)
    }

    pub fn halo(&self) -> Rgb {
        self.palette.halo
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Upright heart centred on `(cx, cy)`: twin lobes on top, point at the bottom.
pub fn heart_path(cx: f32, cy: f32, s: f32) -> Path {
    let p = |dx: f32, dy: f32| point(cx + s * dx, cy + s * dy);
    let mut builder = Path::builder();
    builder.begin(p(0.0, -0.35));
    // Left lobe
    builder.cubic_bezier_to(p(-0.9, -1.2), p(-1.6, -0.5), p(-1.6, 0.1));
    // Left side down to the tip
    builder.cubic_bezier_to(p(-1.6, 0.8), p(-0.6, 1.4), p(0.0, 1.7));
    // Right side
    builder.cubic_bezier_to(p(0.6, 1.4), p(1.6, 0.8), p(1.6, 0.1));
    builder.cubic_bezier_to(p(1.6, -0.5), p(0.9, -1.2), p(0.0, -0.35));
    builder.end(true);
    builder.build()
}
