//! Shape masks.
//!
//! A mask is a grayscale image where pure white (255) marks pixels that
//! words may not cover; every other value is drawable. An uploaded mask
//! always wins over the built-in shape selector.

use crate::config::Shape;
use crate::error::WordCloudError;
use image::imageops::{self, FilterType};
use image::GrayImage;
use std::path::Path;
use tracing::{debug, info};

/// Grayscale value that blocks placement.
pub const BLOCKED: u8 = 255;

/// Where a [`Mask`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskOrigin {
    Uploaded,
    Builtin(Shape),
}

/// A decoded placement mask.
#[derive(Debug, Clone)]
pub struct Mask {
    image: GrayImage,
    origin: MaskOrigin,
}

impl Mask {
    pub fn new(image: GrayImage, origin: MaskOrigin) -> Self {
        Self { image, origin }
    }

    /// Decode PNG (or any format the `image` crate was built with) bytes.
    pub fn decode(bytes: &[u8], origin: MaskOrigin) -> Result<Self, WordCloudError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| WordCloudError::MaskDecode {
                detail: e.to_string(),
            })?
            .to_luma8();
        Ok(Self::new(image, origin))
    }

    pub fn origin(&self) -> MaskOrigin {
        self.origin
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// The mask scaled (nearest neighbour) to exactly `width` × `height`.
    pub fn fit(&self, width: u32, height: u32) -> GrayImage {
        if self.image.dimensions() == (width, height) {
            return self.image.clone();
        }
        debug!(
            "Resizing mask {}x{} → {}x{}",
            self.image.width(),
            self.image.height(),
            width,
            height
        );
        imageops::resize(&self.image, width, height, FilterType::Nearest)
    }

    /// Share of pixels that block placement, in `[0, 1]`.
    pub fn blocked_fraction(&self) -> f64 {
        let total = self.image.width() as usize * self.image.height() as usize;
        if total == 0 {
            return 1.0;
        }
        let blocked = self.image.pixels().filter(|p| p.0[0] == BLOCKED).count();
        blocked as f64 / total as f64
    }
}

/// Resolve the mask for a run.
///
/// `custom` (uploaded bytes) takes precedence; otherwise the built-in
/// `shape` is read from `mask_dir`; [`Shape::None`] yields no mask.
///
/// # Errors
/// - [`WordCloudError::MaskNotFound`] if the shape's file cannot be read
/// - [`WordCloudError::MaskDecode`] if the bytes are not a decodable image
pub fn load_mask(
    custom: Option<&[u8]>,
    shape: Shape,
    mask_dir: &Path,
) -> Result<Option<Mask>, WordCloudError> {
    if let Some(bytes) = custom {
        let mask = Mask::decode(bytes, MaskOrigin::Uploaded)?;
        info!("Using uploaded mask ({}x{})", mask.image.width(), mask.image.height());
        return Ok(Some(mask));
    }

    let Some(file_name) = shape.file_name() else {
        return Ok(None);
    };

    let path = mask_dir.join(file_name);
    let bytes = std::fs::read(&path).map_err(|source| WordCloudError::MaskNotFound {
        shape: shape.name().to_string(),
        path: path.clone(),
        source,
    })?;
    let mask = Mask::decode(&bytes, MaskOrigin::Builtin(shape))?;
    info!("Using built-in '{}' mask from {}", shape, path.display());
    Ok(Some(mask))
}
