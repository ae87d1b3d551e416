//! Font loading and word rasterisation.
//!
//! Words are rasterised with `fontdue` into a coverage bitmap cropped to the
//! ink of the glyphs. The layout stage measures and places these bitmaps and
//! the renderer blends them onto the canvas, so what is measured is exactly
//! what is drawn.

use crate::config::FontChoice;
use crate::error::WordCloudError;
use fontdue::{Font, FontSettings};
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::Path;
use tracing::debug;

/// DejaVu Sans, shipped with the crate so "Default" never touches the disk.
static BUNDLED_FONT: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/fonts/DejaVuSans.ttf"
));

/// A parsed font ready to rasterise words.
pub struct CloudFont {
    font: Font,
    name: String,
}

impl std::fmt::Debug for CloudFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudFont").field("name", &self.name).finish()
    }
}

impl CloudFont {
    /// The bundled default font.
    pub fn bundled() -> Result<Self, WordCloudError> {
        Self::from_bytes("Default", BUNDLED_FONT)
    }

    /// Resolve a [`FontChoice`] against `font_dir`.
    ///
    /// # Errors
    /// - [`WordCloudError::FontNotFound`] if the file is missing
    /// - [`WordCloudError::FontLoad`] if it cannot be read or parsed
    pub fn load(choice: &FontChoice, font_dir: &Path) -> Result<Self, WordCloudError> {
        let name = match choice {
            FontChoice::Default => return Self::bundled(),
            FontChoice::File(name) => name,
        };

        // Only bare file names from the font directory are selectable.
        if Path::new(name).file_name().map(|n| n != name.as_str()).unwrap_or(true) {
            return Err(WordCloudError::FontLoad {
                name: name.clone(),
                detail: "font must be a file name inside the font directory".into(),
            });
        }

        let path = font_dir.join(name);
        if !path.is_file() {
            return Err(WordCloudError::FontNotFound { path });
        }
        let bytes = std::fs::read(&path).map_err(|e| WordCloudError::FontLoad {
            name: name.clone(),
            detail: e.to_string(),
        })?;
        debug!("Loaded font file {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(name, &bytes)
    }

    /// Parse raw TrueType/OpenType bytes.
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, WordCloudError> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|e| {
            WordCloudError::FontLoad {
                name: name.to_string(),
                detail: e.to_string(),
            }
        })?;
        Ok(Self {
            font,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ink box of every visible glyph, relative to the top of the line.
    fn glyph_boxes(&self, text: &str, px: f32) -> Vec<GlyphBox> {
        let ascent = self
            .font
            .horizontal_line_metrics(px)
            .map(|m| m.ascent)
            .unwrap_or(px);

        let mut boxes = Vec::with_capacity(text.len());
        let mut pen = 0.0f32;
        let mut prev: Option<char> = None;
        for c in text.chars() {
            if let Some(p) = prev {
                pen += self.font.horizontal_kern(p, c, px).unwrap_or(0.0);
            }
            let metrics = self.font.metrics(c, px);
            if metrics.width > 0 && metrics.height > 0 {
                boxes.push(GlyphBox {
                    ch: c,
                    x: (pen + metrics.xmin as f32).round() as i32,
                    y: (ascent - metrics.height as f32 - metrics.ymin as f32).round() as i32,
                    width: metrics.width as i32,
                    height: metrics.height as i32,
                });
            }
            pen += metrics.advance_width;
            prev = Some(c);
        }
        boxes
    }

    /// Size of the ink box `text` occupies at `px`, without rasterising.
    ///
    /// Always equal to the dimensions [`CloudFont::rasterize`] returns.
    pub fn measure(&self, text: &str, px: f32) -> Option<(u32, u32)> {
        ink_bounds(&self.glyph_boxes(text, px)).map(|b| (b.width(), b.height()))
    }

    /// Rasterise `text` at `px` pixels into an ink-cropped coverage bitmap.
    ///
    /// Returns `None` when the text has no visible ink (e.g. only spaces).
    pub fn rasterize(&self, text: &str, px: f32) -> Option<GrayImage> {
        let boxes = self.glyph_boxes(text, px);
        let bounds = ink_bounds(&boxes)?;

        let mut bitmap = GrayImage::new(bounds.width(), bounds.height());
        let (bw, bh) = (bitmap.width() as i32, bitmap.height() as i32);
        for g in &boxes {
            let (metrics, coverage) = self.font.rasterize(g.ch, px);
            let ox = g.x - bounds.min_x;
            let oy = g.y - bounds.min_y;
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let v = coverage[row * metrics.width + col];
                    let (x, y) = (ox + col as i32, oy + row as i32);
                    if v == 0 || x < 0 || y < 0 || x >= bw || y >= bh {
                        continue;
                    }
                    let px = bitmap.get_pixel_mut(x as u32, y as u32);
                    px.0[0] = px.0[0].max(v);
                }
            }
        }
        Some(bitmap)
    }
}

struct GlyphBox {
    ch: char,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

struct Bounds {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl Bounds {
    fn width(&self) -> u32 {
        (self.max_x - self.min_x) as u32
    }

    fn height(&self) -> u32 {
        (self.max_y - self.min_y) as u32
    }
}

fn ink_bounds(boxes: &[GlyphBox]) -> Option<Bounds> {
    Some(Bounds {
        min_x: boxes.iter().map(|g| g.x).min()?,
        min_y: boxes.iter().map(|g| g.y).min()?,
        max_x: boxes.iter().map(|g| g.x + g.width).max()?,
        max_y: boxes.iter().map(|g| g.y + g.height).max()?,
    })
}

/// Blend a coverage bitmap onto `canvas` at (`x`, `y`) in `color`.
///
/// Pixels falling outside the canvas are clipped.
pub fn draw_coverage(canvas: &mut RgbImage, coverage: &GrayImage, x: i64, y: i64, color: Rgb<u8>) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    for (gx, gy, Luma([a])) in coverage.enumerate_pixels() {
        if *a == 0 {
            continue;
        }
        let (px, py) = (x + gx as i64, y + gy as i64);
        if px < 0 || py < 0 || px >= cw || py >= ch {
            continue;
        }
        let dst = canvas.get_pixel_mut(px as u32, py as u32);
        let alpha = *a as u32;
        for i in 0..3 {
            let blended = (color.0[i] as u32 * alpha + dst.0[i] as u32 * (255 - alpha) + 127) / 255;
            dst.0[i] = blended as u8;
        }
    }
}

/// Draw `text` with its ink box's top-left corner at (`x`, `y`).
///
/// Returns the ink box size, or `(0, 0)` when nothing was drawn.
pub fn draw_text(
    canvas: &mut RgbImage,
    font: &CloudFont,
    text: &str,
    px: f32,
    x: i64,
    y: i64,
    color: Rgb<u8>,
) -> (u32, u32) {
    match font.rasterize(text, px) {
        Some(bitmap) => {
            draw_coverage(canvas, &bitmap, x, y, color);
            bitmap.dimensions()
        }
        None => (0, 0),
    }
}
