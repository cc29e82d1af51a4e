//! Vector paths are lyon paths in logical coordinates. The canvas flattens
//! them into polylines at a tolerance tied to its pixel size.

use lyon::path::iterator::PathIterator;
use lyon::path::PathEvent;

pub use lyon::math::point;
pub use lyon::path::{Path, Winding};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<(f32, f32)>,
    pub closed: bool,
}

impl Polyline {
    /// Consecutive point pairs, including the closing edge of a closed polyline.
    pub fn segments(&self) -> impl Iterator<Item = ((f32, f32), (f32, f32))> + '_ {
        let closing = if self.closed && self.points.len() > 2 {
            Some((self.points[self.points.len() - 1], self.points[0]))
        } else {
            None
        };
        self.points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(closing)
    }
}

/// Flatten every subpath of `path` into line segments no further than
/// `tolerance` from the true curve.
pub fn flatten(path: &Path, tolerance: f32) -> Vec<Polyline> {
    let mut lines = Vec::new();
    let mut current: Option<Polyline> = None;
    for event in path.iter().flattened(tolerance) {
        match event {
            PathEvent::Begin { at } => {
                current = Some(Polyline {
                    points: vec![(at.x, at.y)],
                    closed: false,
                });
            }
            PathEvent::Line { to, .. }
            | PathEvent::Quadratic { to, .. }
            | PathEvent::Cubic { to, .. } => {
                if let Some(line) = current.as_mut() {
                    line.points.push((to.x, to.y));
                }
            }
            PathEvent::End { close, .. } => {
                if let Some(mut line) = current.take() {
                    line.closed = close;
                    lines.push(line);
                }
            }
        }
    }
    lines
}

/// Axis-aligned bounds `(min_x, min_y, max_x, max_y)` of flattened polylines.
pub fn bounds(lines: &[Polyline]) -> Option<(f32, f32, f32, f32)> {
    let mut points = lines.iter().flat_map(|l| l.points.iter());
    let first = points.next()?;
    Some(points.fold(
        (first.0, first.1, first.0, first.1),
        |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
    ))
}

pub fn circle(cx: f32, cy: f32, r: f32) -> Path {
    let mut builder = Path::builder();
    builder.add_circle(point(cx, cy), r, Winding::Positive);
    builder.build()
}

/// Open two-point path.
pub fn segment(from: (f32, f32), to: (f32, f32)) -> Path {
    let mut builder = Path::builder();
    builder.begin(point(from.0, from.1));
    builder.line_to(point(to.0, to.1));
    builder.end(false);
    builder.build()
}
