//! Software 2D canvas.
//!
//! Pixels are premultiplied RGBA in `0.0..=1.0`. Drawing calls take logical
//! coordinates, which are divided by the canvas scale to land on pixels, so
//! the simulation never needs to know how large a terminal cell is.
//!
//! The surface supports the three compositing modes the display is built on:
//! source-over, additive "lighter", and destination-out for trail fading.

pub mod path;

pub use path::{circle, point, segment, Path};

use path::{bounds, flatten, Polyline};

use crate::palette::Rgb;

// Vertical samples per pixel row when filling.
const FILL_SUBSAMPLES: usize = 4;
// Curve flattening tolerance, in pixels.
const FLATTEN_TOLERANCE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    SourceOver,
    Lighter,
    DestinationOut,
}

/// Straight (non-premultiplied) colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    pub fn from_rgb(c: Rgb, a: f32) -> Self {
        Self {
            r: c.0 as f32 / 255.0,
            g: c.1 as f32 / 255.0,
            b: c.2 as f32 / 255.0,
            a,
        }
    }

    fn premultiplied(self) -> [f32; 4] {
        [self.r * self.a, self.g * self.a, self.b * self.a, self.a]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba,
}

impl ColorStop {
    pub fn new(offset: f32, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// Fill or stroke source. Gradient geometry is in logical coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Linear {
        from: (f32, f32),
        to: (f32, f32),
        stops: Vec<ColorStop>,
    },
    /// Two-circle radial gradient: offset 0 is the zero-radius `focus`, offset 1
    /// is the circle of `radius` around `center`. The focus must lie inside it.
    Radial {
        focus: (f32, f32),
        center: (f32, f32),
        radius: f32,
        stops: Vec<ColorStop>,
    },
}

impl Paint {
    /// Premultiplied colour of the paint at a logical point.
    fn sample(&self, x: f32, y: f32) -> [f32; 4] {
        match self {
            Paint::Solid(c) => c.premultiplied(),
            Paint::Linear { from, to, stops } => {
                let dx = to.0 - from.0;
                let dy = to.1 - from.1;
                let len_sq = dx * dx + dy * dy;
                let t = if len_sq <= f32::EPSILON {
                    1.0
                } else {
                    ((x - from.0) * dx + (y - from.1) * dy) / len_sq
                };
                gradient_at(stops, t)
            }
            Paint::Radial { focus, center, radius, stops } => {
                gradient_at(stops, radial_offset(*focus, *center, *radius, (x, y)))
            }
        }
    }
}

// Offset t of the interpolated circle (focus + t * (center - focus), radius
// t * r) passing through `p`, i.e. the larger root of
// |q - t d|^2 = (t r)^2 with q = p - focus and d = center - focus.
fn radial_offset(focus: (f32, f32), center: (f32, f32), radius: f32, p: (f32, f32)) -> f32 {
    let (dx, dy) = (center.0 - focus.0, center.1 - focus.1);
    let (qx, qy) = (p.0 - focus.0, p.1 - focus.1);
    let a = dx * dx + dy * dy - radius * radius;
    let qd = qx * dx + qy * dy;
    let qq = qx * qx + qy * qy;
    if a.abs() <= f32::EPSILON {
        return if qd > f32::EPSILON { qq / (2.0 * qd) } else { 1.0 };
    }
    let disc = qd * qd - a * qq;
    if disc < 0.0 {
        return 1.0;
    }
    let roots = [(qd + disc.sqrt()) / a, (qd - disc.sqrt()) / a];
    roots.into_iter().fold(0.0, f32::max)
}

// Stops interpolate in premultiplied space so fades to transparent stay clean.
fn gradient_at(stops: &[ColorStop], t: f32) -> [f32; 4] {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return [0.0; 4];
    };
    if t <= first.offset {
        return first.color.premultiplied();
    }
    if t >= last.offset {
        return last.color.premultiplied();
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t >= a.offset && t <= b.offset {
            let span = b.offset - a.offset;
            let k = if span <= f32::EPSILON { 1.0 } else { (t - a.offset) / span };
            let pa = a.color.premultiplied();
            let pb = b.color.premultiplied();
            return [
                pa[0] + (pb[0] - pa[0]) * k,
                pa[1] + (pb[1] - pa[1]) * k,
                pa[2] + (pb[2] - pa[2]) * k,
                pa[3] + (pb[3] - pa[3]) * k,
            ];
        }
    }
    last.color.premultiplied()
}

#[derive(Debug, Clone, Copy)]
struct DrawState {
    composite: Composite,
    global_alpha: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            composite: Composite::SourceOver,
            global_alpha: 1.0,
        }
    }
}

pub struct Canvas {
    width: usize,
    height: usize,
    scale: f32,
    pixels: Vec<[f32; 4]>,
    state: DrawState,
    saved: Vec<DrawState>,
}

impl Canvas {
    /// `scale` is the number of logical units per pixel.
    pub fn new(width: usize, height: usize, scale: f32) -> Self {
        Self {
            width,
            height,
            scale: scale.max(f32::EPSILON),
            pixels: vec![[0.0; 4]; width * height],
            state: DrawState::default(),
            saved: Vec::new(),
        }
    }

    /// Replace the backing store. Contents are cleared, draw state is kept.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![[0.0; 4]; width * height];
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Premultiplied RGBA at a pixel; transparent outside the surface.
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 4] {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            [0.0; 4]
        }
    }

    pub fn composite(&self) -> Composite {
        self.state.composite
    }

    pub fn set_composite(&mut self, composite: Composite) {
        self.state.composite = composite;
    }

    pub fn global_alpha(&self) -> f32 {
        self.state.global_alpha
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.state.global_alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn save(&mut self) {
        self.saved.push(self.state);
    }

    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    /// Paint `color` over the whole surface with the current composite mode.
    pub fn fill_all(&mut self, color: Rgba) {
        let src = color.premultiplied();
        let (composite, alpha) = (self.state.composite, self.state.global_alpha);
        for dst in &mut self.pixels {
            blend(dst, src, alpha, composite);
        }
    }

    /// Fill with the nonzero winding rule.
    pub fn fill_path(&mut self, path: &Path, paint: &Paint) {
        let lines = self.flatten(path);
        let Some((x0, y0, x1, y1)) = bounds(&lines) else {
            return;
        };
        let s = self.scale;
        let Some((px0, py0, px1, py1)) = self.clip(x0 / s, y0 / s, x1 / s, y1 / s, 0.0) else {
            return;
        };

        // Open polylines fill as if closed.
        let edges: Vec<((f32, f32), (f32, f32))> = lines
            .iter()
            .filter(|sub| sub.points.len() > 2)
            .flat_map(|sub| {
                let n = sub.points.len();
                (0..n).map(move |i| (sub.points[i], sub.points[(i + 1) % n]))
            })
            .map(|(a, b)| ((a.0 / s, a.1 / s), (b.0 / s, b.1 / s)))
            .collect();
        if edges.is_empty() {
            return;
        }

        let span_w = px1 - px0;
        let mut row = vec![0.0f32; span_w];
        let mut crossings: Vec<(f32, i32)> = Vec::new();
        let weight = 1.0 / FILL_SUBSAMPLES as f32;

        for py in py0..py1 {
            row.fill(0.0);
            for sub in 0..FILL_SUBSAMPLES {
                let sy = py as f32 + (sub as f32 + 0.5) * weight;
                crossings.clear();
                for &((ax, ay), (bx, by)) in &edges {
                    if (ay <= sy) != (by <= sy) {
                        let x = ax + (sy - ay) * (bx - ax) / (by - ay);
                        crossings.push((x, if by > ay { 1 } else { -1 }));
                    }
                }
                crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

                let mut winding = 0;
                for pair in crossings.windows(2) {
                    winding += pair[0].1;
                    if winding != 0 {
                        accumulate_span(&mut row, px0, pair[0].0, pair[1].0, weight);
                    }
                }
            }
            for (i, &coverage) in row.iter().enumerate() {
                if coverage > 0.0 {
                    self.paint_pixel(px0 + i, py, paint, coverage.min(1.0));
                }
            }
        }
    }

    /// Stroke with round joins. `width` is in logical units; hairlines thinner
    /// than a pixel are drawn one pixel wide at proportionally lower coverage.
    pub fn stroke_path(&mut self, path: &Path, paint: &Paint, width: f32) {
        let lines = self.flatten(path);
        let Some((x0, y0, x1, y1)) = bounds(&lines) else {
            return;
        };
        let s = self.scale;
        let w_px = (width / s).max(0.0);
        if w_px <= 0.0 {
            return;
        }
        let half = w_px.max(1.0) * 0.5;
        let thin = w_px.min(1.0);
        let reach = half + 0.5;
        let Some((px0, py0, px1, py1)) = self.clip(x0 / s, y0 / s, x1 / s, y1 / s, reach) else {
            return;
        };

        // Max coverage per pixel so overlapping segments don't double up.
        let mask_w = px1 - px0;
        let mut mask = vec![0.0f32; mask_w * (py1 - py0)];
        for line in &lines {
            for (a, b) in line.segments() {
                let (ax, ay, bx, by) = (a.0 / s, a.1 / s, b.0 / s, b.1 / s);
                let Some((sx0, sy0, sx1, sy1)) =
                    self.clip(ax.min(bx), ay.min(by), ax.max(bx), ay.max(by), reach)
                else {
                    continue;
                };
                for py in sy0.max(py0)..sy1.min(py1) {
                    for px in sx0.max(px0)..sx1.min(px1) {
                        let d = segment_distance(px as f32 + 0.5, py as f32 + 0.5, ax, ay, bx, by);
                        let coverage = (half + 0.5 - d).clamp(0.0, 1.0) * thin;
                        let slot = &mut mask[(py - py0) * mask_w + (px - px0)];
                        if coverage > *slot {
                            *slot = coverage;
                        }
                    }
                }
            }
        }

        for (i, &coverage) in mask.iter().enumerate() {
            if coverage > 0.0 {
                self.paint_pixel(px0 + i % mask_w, py0 + i / mask_w, paint, coverage);
            }
        }
    }

    fn flatten(&self, path: &Path) -> Vec<Polyline> {
        flatten(path, FLATTEN_TOLERANCE * self.scale)
    }

    fn paint_pixel(&mut self, px: usize, py: usize, paint: &Paint, coverage: f32) {
        let s = self.scale;
        let src = paint.sample((px as f32 + 0.5) * s, (py as f32 + 0.5) * s);
        let alpha = self.state.global_alpha * coverage;
        let composite = self.state.composite;
        let idx = py * self.width + px;
        blend(&mut self.pixels[idx], src, alpha, composite);
    }

    // Pixel-space bounds grown by `pad`, clipped to the surface; None if empty.
    fn clip(&self, x0: f32, y0: f32, x1: f32, y1: f32, pad: f32) -> Option<(usize, usize, usize, usize)> {
        let px0 = (x0 - pad).floor().max(0.0);
        let py0 = (y0 - pad).floor().max(0.0);
        let px1 = (x1 + pad).ceil().min(self.width as f32);
        let py1 = (y1 + pad).ceil().min(self.height as f32);
        if !(px0 < px1 && py0 < py1) {
            return None;
        }
        Some((px0 as usize, py0 as usize, px1 as usize, py1 as usize))
    }
}

fn blend(dst: &mut [f32; 4], src: [f32; 4], alpha: f32, composite: Composite) {
    match composite {
        Composite::SourceOver => {
            let inv = 1.0 - src[3] * alpha;
            for c in 0..4 {
                dst[c] = src[c] * alpha + dst[c] * inv;
            }
        }
        Composite::Lighter => {
            for c in 0..4 {
                dst[c] = (dst[c] + src[c] * alpha).min(1.0);
            }
        }
        Composite::DestinationOut => {
            let keep = 1.0 - src[3] * alpha;
            for c in dst.iter_mut() {
                *c *= keep;
            }
        }
    }
}

// Add horizontal coverage of [xa, xb) to a row that starts at pixel `origin`.
fn accumulate_span(row: &mut [f32], origin: usize, xa: f32, xb: f32, weight: f32) {
    let start = xa.max(origin as f32);
    let end = xb.min((origin + row.len()) as f32);
    if end <= start {
        return;
    }
    let first = start.floor() as usize;
    let last = (end.ceil() as usize).min(origin + row.len());
    for px in first..last {
        let overlap = end.min(px as f32 + 1.0) - start.max(px as f32);
        if overlap > 0.0 {
            row[px - origin] += overlap * weight;
        }
    }
}

fn segment_distance(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let cx = ax + dx * t - px;
    let cy = ay + dy * t - py;
    (cx * cx + cy * cy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> Path {
        let mut builder = Path::builder();
        builder.begin(point(x, y));
        builder.line_to(point(x + size, y));
        builder.line_to(point(x + size, y + size));
        builder.line_to(point(x, y + size));
        builder.end(true);
        builder.build()
    }

    #[test]
    fn fill_covers_interior_and_spares_outside() {
        let mut canvas = Canvas::new(10, 10, 1.0);
        canvas.fill_path(&square(2.0, 2.0, 4.0), &Paint::Solid(Rgba::from_rgb((255, 0, 0), 1.0)));
        let inside = canvas.pixel(3, 3);
        assert!((inside[0] - 1.0).abs() < 1e-4 && (inside[3] - 1.0).abs() < 1e-4);
        assert_eq!(canvas.pixel(8, 8), [0.0; 4]);
        assert_eq!(canvas.pixel(1, 3), [0.0; 4]);
    }

    #[test]
    fn fill_antialiases_partial_pixels() {
        let mut canvas = Canvas::new(10, 10, 1.0);
        canvas.fill_path(&square(2.5, 2.0, 4.0), &Paint::Solid(Rgba::from_rgb((255, 255, 255), 1.0)));
        let edge = canvas.pixel(2, 3)[3];
        assert!((edge - 0.5).abs() < 0.01, "half-covered pixel got {}", edge);
    }

    #[test]
    fn lighter_adds_and_saturates() {
        let mut canvas = Canvas::new(4, 4, 1.0);
        canvas.set_composite(Composite::Lighter);
        let paint = Paint::Solid(Rgba::from_rgb((0, 0, 255), 0.6));
        canvas.fill_path(&square(0.0, 0.0, 4.0), &paint);
        canvas.fill_path(&square(0.0, 0.0, 4.0), &paint);
        let px = canvas.pixel(1, 1);
        assert!((px[2] - 1.0).abs() < 1e-4, "blue should saturate at 1, got {}", px[2]);
        assert_eq!(px[0], 0.0);
    }

    #[test]
    fn destination_out_fades_existing_content() {
        let mut canvas = Canvas::new(4, 4, 1.0);
        canvas.fill_all(Rgba::from_rgb((255, 255, 255), 1.0));
        canvas.set_composite(Composite::DestinationOut);
        canvas.fill_all(Rgba::from_rgb((0, 0, 0), 0.2));
        let px = canvas.pixel(0, 0);
        assert!((px[3] - 0.8).abs() < 1e-5);
        assert!((px[0] - 0.8).abs() < 1e-5);
    }

    #[test]
    fn global_alpha_scales_source() {
        let mut canvas = Canvas::new(4, 4, 1.0);
        canvas.set_global_alpha(0.5);
        canvas.fill_all(Rgba::from_rgb((255, 255, 255), 1.0));
        assert!((canvas.pixel(2, 2)[3] - 0.5).abs() < 1e-5);
        canvas.save();
        canvas.set_global_alpha(0.1);
        canvas.restore();
        assert_eq!(canvas.global_alpha(), 0.5);
    }

    #[test]
    fn stroke_marks_the_line_only() {
        let mut canvas = Canvas::new(20, 20, 1.0);
        canvas.stroke_path(&segment((2.0, 10.5), (18.0, 10.5)), &Paint::Solid(Rgba::from_rgb((255, 255, 255), 1.0)), 1.0);
        assert!(canvas.pixel(10, 10)[3] > 0.9);
        assert_eq!(canvas.pixel(10, 5), [0.0; 4]);
    }

    #[test]
    fn overlapping_segments_do_not_double_up() {
        let mut canvas = Canvas::new(20, 20, 1.0);
        canvas.set_composite(Composite::Lighter);
        let mut builder = Path::builder();
        builder.begin(point(2.0, 10.5));
        builder.line_to(point(10.5, 10.5));
        builder.line_to(point(18.0, 10.5));
        builder.end(false);
        let path = builder.build();
        canvas.stroke_path(&path, &Paint::Solid(Rgba::from_rgb((255, 255, 255), 0.5)), 1.0);
        assert!((canvas.pixel(10, 10)[3] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn linear_gradient_runs_from_transparent_to_opaque() {
        let paint = Paint::Linear {
            from: (0.0, 0.0),
            to: (10.0, 0.0),
            stops: vec![
                ColorStop::new(0.0, Rgba::TRANSPARENT),
                ColorStop::new(1.0, Rgba::from_rgb((255, 255, 255), 1.0)),
            ],
        };
        assert_eq!(paint.sample(-5.0, 0.0)[3], 0.0);
        assert!((paint.sample(5.0, 3.0)[3] - 0.5).abs() < 1e-5);
        assert_eq!(paint.sample(20.0, 0.0)[3], 1.0);
    }

    #[test]
    fn radial_gradient_brightens_toward_rim() {
        let paint = Paint::Radial {
            focus: (0.0, 0.0),
            center: (0.0, 0.0),
            radius: 10.0,
            stops: vec![
                ColorStop::new(0.0, Rgba::from_rgb((255, 255, 255), 0.05)),
                ColorStop::new(1.0, Rgba::from_rgb((255, 255, 255), 0.5)),
            ],
        };
        assert!(paint.sample(0.0, 0.0)[3] < paint.sample(9.0, 0.0)[3]);
        assert!((radial_offset((0.0, 0.0), (0.0, 0.0), 10.0, (0.0, 5.0)) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn focal_radial_starts_at_focus_and_ends_on_outer_circle() {
        let (focus, center, radius) = ((0.0, -5.0), (0.0, 0.0), 10.0);
        let t = |x: f32, y: f32| radial_offset(focus, center, radius, (x, y));
        assert!(t(0.0, -5.0).abs() < 1e-5);
        // The outer circle is centred on `center`, not on the focus.
        assert!((t(0.0, 10.0) - 1.0).abs() < 1e-4);
        assert!((t(0.0, -10.0) - 1.0).abs() < 1e-4);
        assert!((t(10.0, 0.0) - 1.0).abs() < 1e-4);
        assert!((t(0.0, 0.0) - 1.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn filled_circle_keeps_a_round_edge() {
        let mut canvas = Canvas::new(40, 40, 1.0);
        canvas.fill_path(&circle(20.0, 20.0, 16.0), &Paint::Solid(Rgba::from_rgb((255, 255, 255), 1.0)));
        // Along the diagonal the rim sits at 20 + 16 / sqrt(2), about 31.3.
        assert!(canvas.pixel(29, 29)[3] > 0.99);
        assert_eq!(canvas.pixel(33, 33), [0.0; 4]);
        assert!(canvas.pixel(34, 20)[3] > 0.99);
        assert_eq!(canvas.pixel(37, 20), [0.0; 4]);
    }

    #[test]
    fn scale_maps_logical_units_to_pixels() {
        let mut canvas = Canvas::new(10, 10, 4.0);
        canvas.fill_path(&square(8.0, 8.0, 8.0), &Paint::Solid(Rgba::from_rgb((255, 255, 255), 1.0)));
        assert!(canvas.pixel(2, 2)[3] > 0.99);
        assert!(canvas.pixel(3, 3)[3] > 0.99);
        assert_eq!(canvas.pixel(5, 5), [0.0; 4]);
    }

    #[test]
    fn drawing_outside_the_surface_is_ignored() {
        let mut canvas = Canvas::new(5, 5, 1.0);
        canvas.fill_path(&square(50.0, 50.0, 4.0), &Paint::Solid(Rgba::from_rgb((255, 0, 0), 1.0)));
        let mut empty = Canvas::new(0, 0, 1.0);
        empty.fill_path(&square(0.0, 0.0, 4.0), &Paint::Solid(Rgba::from_rgb((255, 0, 0), 1.0)));
        assert!((0..5).all(|y| (0..5).all(|x| canvas.pixel(x, y) == [0.0; 4])));
    }
}
