use crate::sim::{LaunchRequest, Viewport};

/// Preset multi-rocket launches. Every formation is mirror-symmetric about
/// the centre line: positions, heights, palettes and scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formation {
    /// Flat row of equal bursts.
    Line,
    /// Edges burst highest.
    Vee,
    /// Centre bursts highest and largest.
    Arch,
}

impl Formation {
    pub const ALL: [Formation; 3] = [Formation::Line, Formation::Vee, Formation::Arch];

    /// Number-key binding: `1`, `2`, `3`.
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Formation::Line),
            '2' => Some(Formation::Vee),
            '3' => Some(Formation::Arch),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Formation::Line => "line",
            Formation::Vee => "vee",
            Formation::Arch => "arch",
        }
    }

    pub fn default_count(self) -> usize {
        match self {
            Formation::Line => 5,
            Formation::Vee => 5,
            Formation::Arch => 7,
        }
    }

    /// `count` requests from left to right across the middle 70% of the width.
    pub fn requests(self, viewport: Viewport, count: usize) -> Vec<LaunchRequest> {
        let half = (count.saturating_sub(1)) as f32 / 2.0;
        (0..count)
            .map(|i| {
                // -1 at the left end, 0 in the middle, 1 at the right end
                let d = if half > 0.0 { (i as f32 - half) / half } else { 0.0 };
                let x = viewport.center_x() + d * viewport.width * 0.35;
                let (height, scale) = match self {
                    Formation::Line => (0.3, 1.0),
                    Formation::Vee => (0.4 - 0.2 * d.abs(), 0.9),
                    Formation::Arch => (0.2 + 0.15 * d * d, 1.3 - 0.5 * d.abs()),
                };
                LaunchRequest::at(x, viewport.height * height)
                    .with_palette(i.min(count - 1 - i))
                    .with_scale(scale)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 800.0)
    }

    #[test]
    fn formations_are_mirror_symmetric() {
        for formation in Formation::ALL {
            for count in [1, 2, 5, 7] {
                let reqs = formation.requests(viewport(), count);
                assert_eq!(reqs.len(), count);
                for i in 0..count {
                    let (a, b) = (reqs[i], reqs[count - 1 - i]);
                    assert!((a.x - 500.0 + (b.x - 500.0)).abs() < 1e-3, "{} x", formation.name());
                    assert!((a.y - b.y).abs() < 1e-3, "{} y", formation.name());
                    assert_eq!(a.palette_index, b.palette_index);
                    assert_eq!(a.scale, b.scale);
                }
            }
        }
    }

    #[test]
    fn shapes_order_heights() {
        let vee = Formation::Vee.requests(viewport(), 5);
        assert!(vee[0].y < vee[2].y, "vee edges burst higher");
        let arch = Formation::Arch.requests(viewport(), 5);
        assert!(arch[2].y < arch[0].y, "arch centre bursts higher");
        assert!(arch[2].scale > arch[0].scale);
        let line = Formation::Line.requests(viewport(), 5);
        assert!(line.iter().all(|r| r.y == line[0].y));
    }

    #[test]
    fn single_rocket_goes_up_the_middle() {
        let reqs = Formation::Arch.requests(viewport(), 1);
        assert_eq!(reqs[0].x, 500.0);
        assert!(Formation::Line.requests(viewport(), 0).is_empty());
    }

    #[test]
    fn number_keys_map_to_formations() {
        assert_eq!(Formation::from_key('1'), Some(Formation::Line));
        assert_eq!(Formation::from_key('3'), Some(Formation::Arch));
        assert_eq!(Formation::from_key('9'), None);
    }
}
