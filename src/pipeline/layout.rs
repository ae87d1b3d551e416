//! Word placement and cloud rendering.
//!
//! ## Algorithm
//!
//! Words are processed from most to least frequent. Each word's font size is
//! derived from the previous word's size and the ratio of their frequencies
//! (blended by `relative_scaling`). The word is rasterised, optionally
//! rotated 90° counter-clockwise, and a free rectangle of its size plus
//! `margin` is searched for on an occupancy map. Every free position is a
//! candidate and one is drawn uniformly at random. If no position exists the
//! other orientation is tried once, then the font shrinks by `font_step`
//! until `min_font_size`. The first word that cannot be placed at the
//! minimum size ends the layout: every later word is smaller or equal.
//!
//! The occupancy map is a summed-area table over blocked pixels, so testing
//! a rectangle is four lookups. After a word is drawn only the rows from its
//! top edge down are recomputed.
//!
//! When `max_font_size` is unset it is the harmonic mean of the sizes the
//! two most frequent words get when laid out alone at the canvas height.

use crate::config::{CloudConfig, Colormap, HexColor};
use crate::error::WordCloudError;
use crate::pipeline::font::{draw_coverage, CloudFont};
use crate::pipeline::mask::{Mask, BLOCKED};
use crate::pipeline::tokenize::WordCounts;
use crate::progress::ProgressCallback;
use image::imageops;
use image::{GrayImage, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

/// A word drawn on the canvas.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedWord {
    pub word: String,
    /// Frequency relative to the most frequent word, in `(0, 1]`.
    pub frequency: f64,
    pub font_size: u32,
    /// Left edge of the word's ink box.
    pub x: u32,
    /// Top edge of the word's ink box.
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Rotated 90° counter-clockwise.
    pub vertical: bool,
    pub color: HexColor,
    #[serde(skip)]
    pub(crate) bitmap: GrayImage,
}

/// The result of packing words onto a canvas.
#[derive(Debug, Clone, Serialize)]
pub struct CloudLayout {
    pub width: u32,
    pub height: u32,
    /// The normalised frequencies the layout was computed from, most
    /// frequent first. Includes words that did not fit.
    pub frequencies: Vec<(String, f64)>,
    /// Words in placement order.
    pub words: Vec<PlacedWord>,
}

impl CloudLayout {
    pub fn placed_count(&self) -> usize {
        self.words.len()
    }

    /// Whether `word` made it onto the canvas.
    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w.word == word)
    }
}

// ── Occupancy map ─────────────────────────────────────────────────────────

struct OccupancyMap {
    width: usize,
    height: usize,
    occupied: Vec<bool>,
    /// Summed-area table, `(height + 1) × (width + 1)`, zero first row/column.
    integral: Vec<u32>,
}

impl OccupancyMap {
    fn new(width: u32, height: u32, mask: Option<&GrayImage>) -> Self {
        let (w, h) = (width as usize, height as usize);
        let mut occupied = vec![false; w * h];
        if let Some(mask) = mask {
            for (x, y, p) in mask.enumerate_pixels() {
                if p.0[0] == BLOCKED {
                    occupied[y as usize * w + x as usize] = true;
                }
            }
        }
        let mut map = Self {
            width: w,
            height: h,
            occupied,
            integral: vec![0; (w + 1) * (h + 1)],
        };
        map.rebuild_from(0);
        map
    }

    fn rebuild_from(&mut self, row: usize) {
        let stride = self.width + 1;
        for y in row..self.height {
            let mut run = 0u32;
            for x in 0..self.width {
                run += self.occupied[y * self.width + x] as u32;
                self.integral[(y + 1) * stride + x + 1] = self.integral[y * stride + x + 1] + run;
            }
        }
    }

    /// Blocked pixels inside `[x, x+w) × [y, y+h)`.
    fn area(&self, x: usize, y: usize, w: usize, h: usize) -> u32 {
        let stride = self.width + 1;
        let at = |xx: usize, yy: usize| self.integral[yy * stride + xx];
        (at(x + w, y + h) + at(x, y)) - (at(x + w, y) + at(x, y + h))
    }

    fn free_positions(&self, w: usize, h: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let xs = self.width + 1 - w;
        let ys = self.height + 1 - h;
        (0..ys)
            .flat_map(move |y| (0..xs).map(move |x| (x, y)))
            .filter(move |&(x, y)| self.area(x, y, w, h) == 0)
    }

    /// Pick a free `w` × `h` rectangle uniformly at random.
    fn sample_position(&self, w: u32, h: u32, rng: &mut StdRng) -> Option<(u32, u32)> {
        let (w, h) = (w as usize, h as usize);
        if w == 0 || h == 0 || w > self.width || h > self.height {
            return None;
        }
        let blocked = self.area(0, 0, self.width, self.height) as usize;
        if self.width * self.height - blocked < w * h {
            return None;
        }
        let hits = self.free_positions(w, h).count();
        if hits == 0 {
            return None;
        }
        let goal = rng.gen_range(0..hits);
        self.free_positions(w, h)
            .nth(goal)
            .map(|(x, y)| (x as u32, y as u32))
    }

    /// Block every inked pixel of `bitmap` drawn at (`x`, `y`).
    fn mark(&mut self, x: u32, y: u32, bitmap: &GrayImage) {
        for (gx, gy, p) in bitmap.enumerate_pixels() {
            if p.0[0] == 0 {
                continue;
            }
            let (px, py) = ((x + gx) as usize, (y + gy) as usize);
            if px < self.width && py < self.height {
                self.occupied[py * self.width + px] = true;
            }
        }
        self.rebuild_from(y as usize);
    }
}

// ── Packing ───────────────────────────────────────────────────────────────

struct Packer<'a> {
    font: &'a CloudFont,
    width: u32,
    height: u32,
    mask: Option<GrayImage>,
    margin: u32,
    prefer_horizontal: f64,
    min_font_size: u32,
    font_step: u32,
    relative_scaling: f64,
    colormap: Colormap,
    seed: u64,
}

impl Packer<'_> {
    fn pack(
        &self,
        frequencies: &[(String, f64)],
        max_font_size: u32,
        progress: Option<&ProgressCallback>,
    ) -> Vec<PlacedWord> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut occupancy = OccupancyMap::new(self.width, self.height, self.mask.as_ref());
        let rs = self.relative_scaling;
        let total = frequencies.len();

        let mut placed = Vec::new();
        let mut font_size = max_font_size as i64;
        let mut last_freq = 1.0;

        for (idx, (word, freq)) in frequencies.iter().enumerate() {
            if *freq <= 0.0 {
                continue;
            }
            if rs != 0.0 {
                font_size =
                    ((rs * (freq / last_freq) + (1.0 - rs)) * font_size as f64).round() as i64;
            }

            let mut vertical = rng.gen::<f64>() >= self.prefer_horizontal;
            let mut tried_other = false;
            let found = loop {
                if font_size < self.min_font_size as i64 {
                    break None;
                }
                if let Some((x, y, bitmap)) =
                    self.try_place(word, font_size as f32, vertical, &occupancy, &mut rng)
                {
                    break Some((x, y, bitmap));
                }
                if !tried_other && self.prefer_horizontal < 1.0 {
                    vertical = !vertical;
                    tried_other = true;
                } else {
                    font_size -= self.font_step as i64;
                    vertical = false;
                }
            };

            if let Some(cb) = progress {
                cb.on_word_placed(idx + 1, total);
            }
            let Some((x, y, bitmap)) = found else {
                debug!(
                    "'{}' does not fit at {}px; stopping after {} words",
                    word,
                    self.min_font_size,
                    placed.len()
                );
                break;
            };

            let color = HexColor(self.colormap.sample(rng.gen::<f64>()).0);
            occupancy.mark(x, y, &bitmap);
            placed.push(PlacedWord {
                word: word.clone(),
                frequency: *freq,
                font_size: font_size as u32,
                x,
                y,
                width: bitmap.width(),
                height: bitmap.height(),
                vertical,
                color,
                bitmap,
            });
            last_freq = *freq;
        }
        placed
    }

    /// Find a spot for `word` at `px` in the given orientation.
    fn try_place(
        &self,
        word: &str,
        px: f32,
        vertical: bool,
        occupancy: &OccupancyMap,
        rng: &mut StdRng,
    ) -> Option<(u32, u32, GrayImage)> {
        let (w, h) = self.font.measure(word, px)?;
        let (w, h) = if vertical { (h, w) } else { (w, h) };
        let (box_w, box_h) = (w.saturating_add(self.margin), h.saturating_add(self.margin));
        if box_w > self.width || box_h > self.height {
            return None;
        }
        let (x, y) = occupancy.sample_position(box_w, box_h, rng)?;
        let bitmap = self.font.rasterize(word, px)?;
        let bitmap = if vertical {
            imageops::rotate270(&bitmap)
        } else {
            bitmap
        };
        Some((x + self.margin / 2, y + self.margin / 2, bitmap))
    }
}

/// Pack the most frequent words of `counts` onto a canvas.
///
/// # Errors
/// - [`WordCloudError::EmptyVocabulary`] if `counts` is empty
/// - [`WordCloudError::NoSpaceToDraw`] if not a single word fits
pub fn layout_words(
    counts: &WordCounts,
    config: &CloudConfig,
    mask: Option<&Mask>,
    font: &CloudFont,
) -> Result<CloudLayout, WordCloudError> {
    let frequencies = counts.normalized(config.max_words);
    if frequencies.is_empty() {
        return Err(WordCloudError::EmptyVocabulary);
    }
    let (width, height) = (config.width, config.height);
    let no_space = || WordCloudError::NoSpaceToDraw { width, height };

    let packer = Packer {
        font,
        width,
        height,
        mask: mask.map(|m| m.fit(width, height)),
        margin: config.margin,
        prefer_horizontal: config.prefer_horizontal,
        min_font_size: config.min_font_size,
        font_step: config.font_step,
        relative_scaling: config.relative_scaling,
        colormap: config.colormap,
        seed: config.seed,
    };

    let max_font_size = match config.max_font_size {
        Some(size) => size,
        None if frequencies.len() == 1 => height,
        None => {
            let probe = packer.pack(&frequencies[..2], height, None);
            match probe.as_slice() {
                [a, b, ..] => {
                    let (a, b) = (a.font_size as f64, b.font_size as f64);
                    (2.0 * a * b / (a + b)) as u32
                }
                [a] => a.font_size,
                [] => return Err(no_space()),
            }
        }
    };
    debug!("Maximum font size: {}px", max_font_size);

    let words = packer.pack(&frequencies, max_font_size, config.progress_callback.as_ref());
    if words.is_empty() {
        return Err(no_space());
    }
    info!(
        "Placed {}/{} words on a {}x{} canvas",
        words.len(),
        frequencies.len(),
        width,
        height
    );

    Ok(CloudLayout {
        width,
        height,
        frequencies,
        words,
    })
}

/// Draw a layout onto a canvas filled with `background`.
pub fn render_layout(layout: &CloudLayout, background: HexColor) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(layout.width, layout.height, background.to_rgb());
    for word in &layout.words {
        draw_coverage(
            &mut canvas,
            &word.bitmap,
            word.x as i64,
            word.y as i64,
            word.color.to_rgb(),
        );
    }
    canvas
}
