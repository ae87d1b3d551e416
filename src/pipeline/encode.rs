//! Image encoding: `RgbImage` → PNG bytes, optionally as a base64 data-URI.
//!
//! PNG is lossless, so the text edges of small words survive encoding. The
//! data-URI form lets a JSON consumer embed the cloud without a second file.

use crate::error::WordCloudError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbImage;
use std::io::Cursor;
use tracing::debug;

/// Encode an image as PNG bytes.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, WordCloudError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| WordCloudError::ImageEncode(e.to_string()))?;
    debug!(
        "Encoded {}x{} image → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}

/// Encode an image as a `data:image/png;base64,...` URI.
pub fn encode_data_uri(img: &RgbImage) -> Result<String, WordCloudError> {
    let png = encode_png(img)?;
    let b64 = STANDARD.encode(&png);
    debug!("Encoded image → {} bytes base64", b64.len());
    Ok(format!("data:image/png;base64,{b64}"))
}
