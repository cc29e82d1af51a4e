//! Word mosaic drawn behind the fireworks: a grid of square cells that fade
//! in where the current word's glyphs fall.

pub mod font;

use noise::{NoiseFn, Perlin};

use crate::config::MosaicConfig;
use crate::palette::Rgb;

const PALETTE: [Rgb; 4] = [
    (0xFF, 0xFF, 0xFF),
    (0xF8, 0xF8, 0xFF),
    (0xF0, 0xF8, 0xFF),
    (0xE5, 0xE4, 0xE2),
];

const SNAP: f32 = 0.005;
const VISIBLE: f32 = 0.01;
const HIGHLIGHT_ABOVE: f32 = 0.8;
const HIGHLIGHT_ALPHA: f32 = 0.4;
const RECOLOR_CHANCE: f32 = 0.05;

#[derive(Debug, Clone, Copy)]
struct Cell {
    color: Rgb,
    alpha: f32,
    target: f32,
    speed: f32,
}

impl Cell {
    fn random() -> Self {
        Self {
            color: random_color(),
            alpha: 0.0,
            target: 0.0,
            speed: 0.05 + fastrand::f32() * 0.08,
        }
    }

    fn ease(&mut self) {
        let diff = self.target - self.alpha;
        if diff.abs() > SNAP {
            self.alpha += diff * self.speed;
        } else {
            self.alpha = self.target;
        }
    }
}

fn random_color() -> Rgb {
    PALETTE[fastrand::usize(..PALETTE.len())]
}

pub struct MosaicLayer {
    width: usize,
    height: usize,
    cell_size: usize,
    gap: usize,
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
    words: Vec<String>,
    word_index: usize,
    animate: bool,
    switch_after: f32,
    since_switch: f32,
    time: f32,
    shimmer: Perlin,
}

impl MosaicLayer {
    /// Layer over a `width`×`height` pixel surface.
    pub fn new(width: usize, height: usize, config: &MosaicConfig) -> Self {
        let mut layer = Self {
            width: 0,
            height: 0,
            cell_size: config.cell_size.max(1),
            gap: config.gap,
            cols: 0,
            rows: 0,
            cells: Vec::new(),
            words: config.words.clone(),
            word_index: 0,
            animate: config.animate,
            switch_after: config.switch_ms as f32 / 1000.0,
            since_switch: 0.0,
            time: 0.0,
            shimmer: Perlin::new(fastrand::u32(0..1000)),
        };
        layer.resize(width, height);
        layer
    }

    /// Rebuild the grid for a new surface size. Every cell starts dark.
    pub fn resize(&mut self, width: usize, height: usize) {
        let pitch = self.pitch();
        self.width = width;
        self.height = height;
        self.cols = width.div_ceil(pitch);
        self.rows = height.div_ceil(pitch);
        self.cells = (0..self.cols * self.rows).map(|_| Cell::random()).collect();
        self.retarget();
    }

    pub fn set_words(&mut self, words: Vec<String>) {
        self.words = words;
        if !self.animate {
            // Static mode shows the change right away
            self.word_index = 0;
            self.retarget();
        }
    }

    pub fn set_animate(&mut self, animate: bool) {
        self.animate = animate;
        self.since_switch = 0.0;
    }

    pub fn animate(&self) -> bool {
        self.animate
    }

    pub fn current_word(&self) -> &str {
        if self.words.is_empty() {
            ""
        } else {
            &self.words[self.word_index % self.words.len()]
        }
    }

    /// Advance one frame of `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        if self.animate {
            self.since_switch += dt;
            if self.since_switch > self.switch_after {
                if !self.words.is_empty() {
                    self.word_index = (self.word_index + 1) % self.words.len();
                    self.retarget();
                }
                self.since_switch = 0.0;
            }
        } else {
            self.since_switch = 0.0;
        }

        for cell in &mut self.cells {
            cell.ease();
        }
    }

    /// Premultiplied RGBA of pixel `(px, py)`, or `None` where the layer is
    /// transparent.
    pub fn sample(&self, px: usize, py: usize) -> Option<[f32; 4]> {
        if px >= self.width || py >= self.height {
            return None;
        }
        let pitch = self.pitch();
        let (c, ox) = (px / pitch, px % pitch);
        let (r, oy) = (py / pitch, py % pitch);
        if ox >= self.cell_size || oy >= self.cell_size {
            return None;
        }
        let cell = self.cells.get(r * self.cols + c)?;
        if cell.alpha <= VISIBLE {
            return None;
        }

        let glint = self
            .shimmer
            .get([c as f64 * 0.15, r as f64 * 0.15, self.time as f64 * 0.5]) as f32;
        let bright = (1.0 + glint * 0.08).clamp(0.0, 1.0);
        let a = cell.alpha;
        let mut out = [
            cell.color.0 as f32 / 255.0 * bright * a,
            cell.color.1 as f32 / 255.0 * bright * a,
            cell.color.2 as f32 / 255.0 * bright * a,
            a,
        ];

        let inset = self.cell_size / 4;
        let interior = self.cell_size >= 3
            && (inset.max(1)..self.cell_size - inset.max(1)).contains(&ox)
            && (inset.max(1)..self.cell_size - inset.max(1)).contains(&oy);
        if a > HIGHLIGHT_ABOVE && interior {
            let h = HIGHLIGHT_ALPHA * a;
            for v in &mut out {
                *v = h + *v * (1.0 - h);
            }
        }
        Some(out)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_alpha(&self, col: usize, row: usize) -> f32 {
        self.cells.get(row * self.cols + col).map_or(0.0, |c| c.alpha)
    }

    pub fn cell_target(&self, col: usize, row: usize) -> f32 {
        self.cells.get(row * self.cols + col).map_or(0.0, |c| c.target)
    }

    fn pitch(&self) -> usize {
        self.cell_size + self.gap
    }

    // Point every cell at the current word, scaled to fit and centred.
    fn retarget(&mut self) {
        let word = self.current_word().to_string();
        let text_w = font::text_width(&word);
        let text_h = font::GLYPH_HEIGHT;

        let k = if text_w == 0 {
            1
        } else {
            (self.cols * 9 / 10 / text_w)
                .min(self.rows * 6 / 10 / text_h)
                .max(1)
        };
        let x0 = (self.cols as isize - (text_w * k) as isize) / 2;
        let y0 = (self.rows as isize - (text_h * k) as isize) / 2;

        for r in 0..self.rows {
            for c in 0..self.cols {
                let dx = c as isize - x0;
                let dy = r as isize - y0;
                let lit = dx >= 0
                    && dy >= 0
                    && font::dot(&word, dx as usize / k, dy as usize / k);

                let cell = &mut self.cells[r * self.cols + c];
                cell.target = if lit { 1.0 } else { 0.0 };
                if fastrand::f32() < RECOLOR_CHANCE {
                    cell.color = random_color();
                }
            }
        }
        log::debug!("mosaic shows {:?} at {}x scale", word, k);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(words: &[&str], animate: bool) -> MosaicConfig {
        MosaicConfig {
            words: words.iter().map(|w| w.to_string()).collect(),
            animate,
            ..MosaicConfig::default()
        }
    }

    fn lit_targets(layer: &MosaicLayer) -> usize {
        (0..layer.rows())
            .flat_map(|r| (0..layer.cols()).map(move |c| (c, r)))
            .filter(|&(c, r)| layer.cell_target(c, r) == 1.0)
            .count()
    }

    #[test]
    fn grid_covers_the_surface() {
        let layer = MosaicLayer::new(160, 90, &config(&["HI"], false));
        // pitch 4: ceil(160/4), ceil(90/4)
        assert_eq!((layer.cols(), layer.rows()), (40, 23));
    }

    #[test]
    fn cells_ease_in_and_snap() {
        let mut layer = MosaicLayer::new(160, 90, &config(&["H"], false));
        assert!(lit_targets(&layer) > 0);
        for _ in 0..400 {
            layer.update(1.0 / 60.0);
        }
        for r in 0..layer.rows() {
            for c in 0..layer.cols() {
                assert_eq!(layer.cell_alpha(c, r), layer.cell_target(c, r));
            }
        }
    }

    #[test]
    fn sample_skips_gaps_and_dark_cells() {
        let mut layer = MosaicLayer::new(160, 90, &config(&["H"], false));
        for _ in 0..400 {
            layer.update(1.0 / 60.0);
        }
        let (c, r) = (0..layer.rows())
            .flat_map(|r| (0..layer.cols()).map(move |c| (c, r)))
            .find(|&(c, r)| layer.cell_target(c, r) == 1.0)
            .expect("word has lit cells");
        let lit = layer.sample(c * 4, r * 4).expect("lit cell is visible");
        assert!(lit[3] > 0.99 && lit[0] > 0.8);
        // highlight brightens the centre pixel
        let centre = layer.sample(c * 4 + 1, r * 4 + 1).expect("centre visible");
        assert!(centre[0] >= lit[0]);
        assert!(layer.sample(c * 4 + 3, r * 4).is_none(), "gap column");
        assert!(layer.sample(0, 0).is_none(), "corner is outside the word");
        assert!(layer.sample(1000, 0).is_none());
    }

    #[test]
    fn animated_words_switch_on_interval() {
        let mut layer = MosaicLayer::new(160, 90, &config(&["A", "B"], true));
        assert_eq!(layer.current_word(), "A");
        for _ in 0..60 {
            layer.update(1.0 / 60.0);
        }
        assert_eq!(layer.current_word(), "A");
        for _ in 0..40 {
            layer.update(1.0 / 60.0);
        }
        assert_eq!(layer.current_word(), "B");
    }

    #[test]
    fn static_word_change_retargets_now() {
        let mut layer = MosaicLayer::new(160, 90, &config(&["I"], false));
        let before = lit_targets(&layer);
        layer.set_words(vec!["W".to_string()]);
        assert_eq!(layer.current_word(), "W");
        assert_ne!(lit_targets(&layer), before);

        layer.set_words(Vec::new());
        assert_eq!(lit_targets(&layer), 0);
    }

    #[test]
    fn resize_rebuilds_dark_grid() {
        let mut layer = MosaicLayer::new(160, 90, &config(&["H"], false));
        for _ in 0..100 {
            layer.update(1.0 / 60.0);
        }
        layer.resize(80, 40);
        assert_eq!((layer.cols(), layer.rows()), (20, 10));
        assert!(lit_targets(&layer) > 0);
        assert!((0..10).all(|r| (0..20).all(|c| layer.cell_alpha(c, r) == 0.0)));
    }
}
