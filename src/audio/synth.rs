//! Procedural launch and explosion sounds as plain sample iterators.

use std::f32::consts::TAU;

pub const SAMPLE_RATE: u32 = 44_100;

/// Floor for exponential ramps; they cannot reach zero.
const EXP_FLOOR: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Ramp {
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    end_t: f32,
    end_v: f32,
    ramp: Ramp,
}

/// Piecewise automation curve over time in seconds. Holds its last value.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    start: f32,
    segments: Vec<Segment>,
}

impl Curve {
    pub fn hold(value: f32) -> Self {
        Self {
            start: value,
            segments: Vec::new(),
        }
    }

    pub fn linear_to(mut self, t: f32, value: f32) -> Self {
        self.segments.push(Segment {
            end_t: t,
            end_v: value,
            ramp: Ramp::Linear,
        });
        self
    }

    pub fn exp_to(mut self, t: f32, value: f32) -> Self {
        self.segments.push(Segment {
            end_t: t,
            end_v: value.max(EXP_FLOOR),
            ramp: Ramp::Exponential,
        });
        self
    }

    pub fn at(&self, t: f32) -> f32 {
        let (mut t0, mut v0) = (0.0, self.start);
        for seg in &self.segments {
            if t < seg.end_t {
                let span = seg.end_t - t0;
                let frac = if span > 0.0 { ((t - t0) / span).clamp(0.0, 1.0) } else { 1.0 };
                return match seg.ramp {
                    Ramp::Linear => v0 + (seg.end_v - v0) * frac,
                    Ramp::Exponential => {
                        let from = v0.max(EXP_FLOOR);
                        from * (seg.end_v / from).powf(frac)
                    }
                };
            }
            t0 = seg.end_t;
            v0 = seg.end_v;
        }
        v0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Saw,
}

/// An oscillator with pitch and gain automation.
#[derive(Debug, Clone)]
pub struct Voice {
    wave: Wave,
    freq: Curve,
    gain: Curve,
    total: usize,
    n: usize,
    phase: f32,
}

impl Voice {
    pub fn new(wave: Wave, freq: Curve, gain: Curve, seconds: f32) -> Self {
        Self {
            wave,
            freq,
            gain,
            total: (seconds * SAMPLE_RATE as f32).round() as usize,
            n: 0,
            phase: 0.0,
        }
    }
}

impl Iterator for Voice {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.n >= self.total {
            return None;
        }
        let t = self.n as f32 / SAMPLE_RATE as f32;
        self.n += 1;

        let osc = match self.wave {
            Wave::Sine => (self.phase * TAU).sin(),
            Wave::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Wave::Saw => self.phase * 2.0 - 1.0,
        };
        self.phase = (self.phase + self.freq.at(t) / SAMPLE_RATE as f32).fract();
        Some(osc * self.gain.at(t))
    }
}

/// Low-passed brown noise for the crackle tail of a burst.
#[derive(Debug, Clone)]
pub struct Crackle {
    cutoff: Curve,
    gain: Curve,
    total: usize,
    n: usize,
    brown: f32,
    filtered: f32,
}

impl Crackle {
    pub fn new(cutoff: Curve, gain: Curve, seconds: f32) -> Self {
        Self {
            cutoff,
            gain,
            total: (seconds * SAMPLE_RATE as f32).round() as usize,
            n: 0,
            brown: 0.0,
            filtered: 0.0,
        }
    }
}

impl Iterator for Crackle {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.n >= self.total {
            return None;
        }
        let t = self.n as f32 / SAMPLE_RATE as f32;
        self.n += 1;

        let white = fastrand::f32() * 2.0 - 1.0;
        self.brown = (self.brown + 0.02 * white) / 1.02;
        let x = self.brown * 3.5;

        // One-pole low-pass
        let fc = self.cutoff.at(t).max(0.0);
        let k = 1.0 - (-TAU * fc / SAMPLE_RATE as f32).exp();
        self.filtered += k * (x - self.filtered);
        Some(self.filtered * self.gain.at(t))
    }
}

#[derive(Debug, Clone)]
pub enum Sound {
    Tone(Voice),
    Noise(Crackle),
}

impl Iterator for Sound {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        match self {
            Sound::Tone(v) => v.next(),
            Sound::Noise(c) => c.next(),
        }
    }
}

/// A sound and how long after the event it starts.
#[derive(Debug, Clone)]
pub struct Cue {
    pub sound: Sound,
    pub delay: f32,
}

impl Cue {
    fn now(sound: Sound) -> Self {
        Self { sound, delay: 0.0 }
    }
}

/// Mortar thump plus a rising whistle.
pub fn launch_cues() -> Vec<Cue> {
    let thump = Voice::new(
        Wave::Square,
        Curve::hold(150.0).exp_to(0.15, 40.0),
        Curve::hold(0.15).exp_to(0.15, 0.001),
        0.15,
    );
    let whistle = Voice::new(
        Wave::Sine,
        Curve::hold(200.0).linear_to(1.0, 600.0),
        Curve::hold(0.0).linear_to(0.1, 0.05).linear_to(1.0, 0.0),
        1.0,
    );
    vec![Cue::now(Sound::Tone(thump)), Cue::now(Sound::Tone(whistle))]
}

/// Low boom, noise crackle and a short delayed sawtooth echo.
pub fn explosion_cues() -> Vec<Cue> {
    let boom = Voice::new(
        Wave::Sine,
        Curve::hold(120.0).exp_to(0.3, 30.0),
        Curve::hold(0.5).exp_to(0.5, 0.001),
        0.5,
    );
    let crackle = Crackle::new(
        Curve::hold(800.0).linear_to(1.5, 0.0),
        Curve::hold(0.8).exp_to(1.5, 0.001),
        1.5,
    );
    let echo = Voice::new(
        Wave::Saw,
        Curve::hold(100.0 + fastrand::f32() * 100.0),
        Curve::hold(0.05).exp_to(0.1, 0.001),
        0.1,
    );
    vec![
        Cue::now(Sound::Tone(boom)),
        Cue::now(Sound::Noise(crackle)),
        Cue {
            sound: Sound::Tone(echo),
            delay: 0.1 + fastrand::f32() * 0.2,
        },
    ]
}
