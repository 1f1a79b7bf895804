use image::{ImageError, ImageFormat};
use std::fs;
use std::path::Path;

pub const PNG_MEDIA_TYPE: &str = "image/png";

/// Decode an embedded image blob and re-encode it as PNG.
///
/// The PNG is written to `dest` (inside the conversion's scratch directory)
/// and read back, so the returned bytes are exactly what was stored.
pub fn reencode_png(data: &[u8], dest: &Path) -> Result<Vec<u8>, ImageError> {
    let img = image::load_from_memory(data)?;
    img.save_with_format(dest, ImageFormat::Png)?;
    Ok(fs::read(dest)?)
}

/// In-package path for the `n`th extracted image
pub fn image_path(n: usize) -> String {
    format!("images/image_{}.png", n)
}
