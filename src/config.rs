//! Runtime configuration, optionally loaded from a TOML file.
//!
//! [`ShowConfig`] carries every tuning constant of the display: per-type
//! particle physics, explosion group sizes, rocket ascent policy, the palette
//! list and the mosaic background. Every table defaults to the compiled
//! values below, so a minimal file can override just the keys you care about:
//!
//! ```toml
//! fade_alpha = 0.15
//!
//! [rocket.ascent]
//! policy = "eased"
//! damping = 0.06
//! min_speed = 2.0
//!
//! [[palettes]]
//! inner = "#ff66cc"
//! halo = "#ff0066"
//! ```
//!
//! Per-particle-type tables (`[particles.shell]` etc.) are replaced as a
//! whole, so a table that is present must list every key except `trail_len`.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ShowError, ShowResult};
use crate::palette::{Palette, ROCKET_COLOR, Rgb, hex_color};
use crate::sim::particle::ParticleKind;

/// Inclusive float range, written as `[min, max]` in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f32; 2]")]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self) -> f32 {
        self.min + fastrand::f32() * (self.max - self.min)
    }

    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }
}

impl From<[f32; 2]> for Span {
    fn from([min, max]: [f32; 2]) -> Self {
        Self { min, max }
    }
}

/// Inclusive count range, written as `[min, max]` in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "[usize; 2]")]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn sample(&self) -> usize {
        if self.max <= self.min {
            self.min
        } else {
            fastrand::usize(self.min..=self.max)
        }
    }
}

impl From<[usize; 2]> for CountRange {
    fn from([min, max]: [usize; 2]) -> Self {
        Self { min, max }
    }
}

/// Physics and bloom tuning for one particle type.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct KindTuning {
    pub friction: f32,
    pub gravity: f32,
    /// Lifetime in frames.
    pub life: Span,
    /// Target size before the burst scale is applied.
    pub base_size: f32,
    /// Frames before the shape starts growing.
    pub bloom_delay: Span,
    #[serde(default = "default_particle_trail")]
    pub trail_len: usize,
}

fn default_particle_trail() -> usize {
    25
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub core: KindTuning,
    pub shell: KindTuning,
    pub willow: KindTuning,
    pub sparkle: KindTuning,
    /// Peak-to-peak turbulence added to shell velocity each frame.
    pub shell_jitter: f32,
    /// Fraction of the remaining size gap closed per frame once blooming.
    pub bloom_rate: f32,
}

impl ParticleConfig {
    pub fn tuning(&self, kind: ParticleKind) -> &KindTuning {
        match kind {
            ParticleKind::Core => &self.core,
            ParticleKind::Shell => &self.shell,
            ParticleKind::Willow => &self.willow,
            ParticleKind::Sparkle => &self.sparkle,
        }
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            shell: KindTuning {
                friction: 0.975,
                gravity: 0.022,
                life: Span::new(150.0, 200.0),
                base_size: 16.0,
                bloom_delay: Span::new(19.0, 38.0),
                trail_len: 25,
            },
            core: KindTuning {
                friction: 0.936,
                gravity: 0.022,
                life: Span::new(75.0, 100.0),
                base_size: 10.0,
                bloom_delay: Span::new(0.0, 0.0),
                trail_len: 25,
            },
            willow: KindTuning {
                friction: 0.944,
                gravity: 0.013,
                life: Span::new(175.0, 225.0),
                base_size: 9.0,
                bloom_delay: Span::new(6.0, 19.0),
                trail_len: 25,
            },
            sparkle: KindTuning {
                friction: 0.90,
                gravity: 0.025,
                life: Span::new(65.0, 95.0),
                base_size: 6.0,
                bloom_delay: Span::new(0.0, 0.0),
                trail_len: 25,
            },
            shell_jitter: 0.08,
            bloom_rate: 0.15,
        }
    }
}

/// How a rocket climbs toward its burst height.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum AscentPolicy {
    /// Fixed climb per frame.
    Constant { speed: f32 },
    /// `max(min_speed, remaining * damping)` per frame; slows into the target.
    Eased { damping: f32, min_speed: f32 },
}

impl Default for AscentPolicy {
    fn default() -> Self {
        AscentPolicy::Constant { speed: 12.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RocketConfig {
    pub ascent: AscentPolicy,
    pub trail_len: usize,
    /// Per-frame alpha multiplier applied to every trail point.
    pub trail_decay: f32,
    /// Peak-to-peak horizontal wobble of recorded trail points.
    pub jitter: f32,
    /// Distance above the target that already counts as arrived.
    pub tolerance: f32,
    /// Bursts are kept at least this fraction of the viewport above the bottom.
    pub min_altitude_fraction: f32,
    #[serde(deserialize_with = "hex_color")]
    pub color: Rgb,
}

impl Default for RocketConfig {
    fn default() -> Self {
        Self {
            ascent: AscentPolicy::default(),
            trail_len: 20,
            trail_decay: 0.85,
            jitter: 1.0,
            tolerance: 0.5,
            min_altitude_fraction: 0.1,
            color: ROCKET_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
    pub core_count: usize,
    /// Core speeds are drawn from `[0, core_speed)`.
    pub core_speed: f32,
    pub shell_count: CountRange,
    pub shell_speed: Span,
    pub accent_count: CountRange,
    pub accent_speed: Span,
    /// Probability that an accent particle is a willow instead of a sparkle.
    pub willow_ratio: f32,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            core_count: 15,
            core_speed: 2.0,
            shell_count: CountRange::new(80, 120),
            shell_speed: Span::new(4.8, 9.6),
            accent_count: CountRange::new(30, 40),
            accent_speed: Span::new(0.0, 8.0),
            willow_ratio: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    pub words: Vec<String>,
    /// Cell edge in canvas pixels.
    pub cell_size: usize,
    pub gap: usize,
    pub switch_ms: u64,
    pub opacity: f32,
    pub animate: bool,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            words: vec!["HAPPY".to_string(), "NEW".to_string(), "YEAR".to_string()],
            cell_size: 3,
            gap: 1,
            switch_ms: 1500,
            opacity: 0.9,
            animate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AutoLaunchConfig {
    /// Seconds between automatic launches.
    pub interval: Span,
}

impl Default for AutoLaunchConfig {
    fn default() -> Self {
        Self {
            interval: Span::new(0.3, 1.1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShowConfig {
    /// Simulation frames per second; one frame is one physics step.
    pub fps: f32,
    /// Logical units per canvas pixel.
    pub pixel_scale: f32,
    /// Strength of the per-frame destination-out fade.
    pub fade_alpha: f32,
    #[serde(deserialize_with = "hex_color")]
    pub background: Rgb,
    pub rocket: RocketConfig,
    pub explosion: ExplosionConfig,
    pub particles: ParticleConfig,
    pub palettes: Vec<Palette>,
    pub mosaic: MosaicConfig,
    pub auto_launch: AutoLaunchConfig,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            fps: 60.0,
            pixel_scale: 4.0,
            fade_alpha: 0.2,
            background: (5, 5, 5),
            rocket: RocketConfig::default(),
            explosion: ExplosionConfig::default(),
            particles: ParticleConfig::default(),
            palettes: vec![Palette::MYSTIC_BLUE],
            mosaic: MosaicConfig::default(),
            auto_launch: AutoLaunchConfig::default(),
        }
    }
}

impl ShowConfig {
    /// Read and validate a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> ShowResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents).map_err(|source| ShowError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Reject values the simulation cannot work with.
    pub fn validate(&self) -> ShowResult<()> {
        positive("fps", self.fps)?;
        positive("pixel_scale", self.pixel_scale)?;
        unit("fade_alpha", self.fade_alpha)?;
        if self.palettes.is_empty() {
            return Err(invalid("palettes", "at least one palette is required"));
        }

        match self.rocket.ascent {
            AscentPolicy::Constant { speed } => positive("rocket.ascent.speed", speed)?,
            AscentPolicy::Eased { damping, min_speed } => {
                positive("rocket.ascent.damping", damping)?;
                positive("rocket.ascent.min_speed", min_speed)?;
            }
        }
        unit("rocket.trail_decay", self.rocket.trail_decay)?;
        unit("rocket.min_altitude_fraction", self.rocket.min_altitude_fraction)?;

        let e = &self.explosion;
        ordered_counts("explosion.shell_count", e.shell_count)?;
        ordered_counts("explosion.accent_count", e.accent_count)?;
        ordered_span("explosion.shell_speed", e.shell_speed)?;
        ordered_span("explosion.accent_speed", e.accent_speed)?;
        unit("explosion.willow_ratio", e.willow_ratio)?;

        let p = &self.particles;
        for (name, t) in [
            ("particles.core", &p.core),
            ("particles.shell", &p.shell),
            ("particles.willow", &p.willow),
            ("particles.sparkle", &p.sparkle),
        ] {
            if !(t.friction > 0.0 && t.friction <= 1.0) {
                return Err(invalid(name, "friction must be in (0, 1]"));
            }
            if t.life.min <= 0.0 || t.life.max < t.life.min {
                return Err(invalid(name, "life must be a positive [min, max] range"));
            }
            if t.bloom_delay.min < 0.0 || t.bloom_delay.max < t.bloom_delay.min {
                return Err(invalid(name, "bloom_delay must be a non-negative [min, max] range"));
            }
        }
        if !(p.bloom_rate > 0.0 && p.bloom_rate <= 1.0) {
            return Err(invalid("particles.bloom_rate", "must be in (0, 1]"));
        }

        if self.mosaic.cell_size == 0 {
            return Err(invalid("mosaic.cell_size", "must be at least 1"));
        }
        unit("mosaic.opacity", self.mosaic.opacity)?;
        ordered_span("auto_launch.interval", self.auto_launch.interval)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ShowError {
    ShowError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, v: f32) -> ShowResult<()> {
    if v > 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be positive, got {}", v)))
    }
}

fn unit(field: &'static str, v: f32) -> ShowResult<()> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be in [0, 1], got {}", v)))
    }
}

fn ordered_counts(field: &'static str, r: CountRange) -> ShowResult<()> {
    if r.min <= r.max {
        Ok(())
    } else {
        Err(invalid(field, &format!("min {} exceeds max {}", r.min, r.max)))
    }
}

fn ordered_span(field: &'static str, s: Span) -> ShowResult<()> {
    if s.min <= s.max && s.min >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("expected 0 <= min <= max, got [{}, {}]", s.min, s.max)))
    }
}
