//! Final compositing and terminal output.
//!
//! Each terminal cell shows two stacked pixels through a lower half block:
//! the cell background is the top pixel, the foreground the bottom one.

use std::io::{self, Write};

use crate::canvas::Canvas;
use crate::mosaic::MosaicLayer;
use crate::palette::Rgb;

pub struct Presenter {
    background: Rgb,
    mosaic_opacity: f32,
    output_buf: Vec<u8>,
}

impl Presenter {
    pub fn new(background: Rgb, mosaic_opacity: f32) -> Self {
        Self {
            background,
            mosaic_opacity: mosaic_opacity.clamp(0.0, 1.0),
            output_buf: Vec::new(),
        }
    }

    /// Colour of pixel `(x, y)`: background, then the mosaic screen-blended
    /// at the layer opacity, then the fireworks canvas over the top.
    pub fn shade(
        &self,
        canvas: Option<&Canvas>,
        mosaic: Option<&MosaicLayer>,
        x: usize,
        y: usize,
    ) -> Rgb {
        let mut out = [
            self.background.0 as f32 / 255.0,
            self.background.1 as f32 / 255.0,
            self.background.2 as f32 / 255.0,
        ];

        if let Some(m) = mosaic.and_then(|m| m.sample(x, y)) {
            let a = m[3] * self.mosaic_opacity;
            for c in 0..3 {
                out[c] = blend_screen(out[c], m[c] / m[3], a);
            }
        }

        if let Some(canvas) = canvas {
            let p = canvas.pixel(x, y);
            for c in 0..3 {
                out[c] = p[c] + out[c] * (1.0 - p[3]);
            }
        }

        (to_byte(out[0]), to_byte(out[1]), to_byte(out[2]))
    }

    /// Write one full frame of `width`×`height` pixels.
    pub fn render<W: Write>(
        &mut self,
        out: &mut W,
        width: usize,
        height: usize,
        canvas: Option<&Canvas>,
        mosaic: Option<&MosaicLayer>,
    ) -> io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        // None forces the first escape of every row
        let mut prev_top: Option<Rgb> = None;
        let mut prev_bot: Option<Rgb> = None;

        for y in (0..height).step_by(2) {
            for x in 0..width {
                let top = self.shade(canvas, mosaic, x, y);
                let bot = if y + 1 < height {
                    self.shade(canvas, mosaic, x, y + 1)
                } else {
                    top
                };

                if prev_top != Some(top) {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = Some(top);
                }
                if prev_bot != Some(bot) {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = Some(bot);
                }

                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top = None;
            prev_bot = None;
            if y + 2 < height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        out.flush()
    }
}

/// Screen blend of `src` onto `dst`, mixed in by `alpha`.
pub fn blend_screen(dst: f32, src: f32, alpha: f32) -> f32 {
    let screened = dst + src - dst * src;
    dst + (screened - dst) * alpha
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
