//! PNG screenshots of the stable frame.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::Vic;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot write screenshot: {0}")]
    Io(#[from] io::Error),
    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),
}

/// Encode an ARGB32 frame as an RGBA PNG into `out`.
///
/// # Errors
///
/// Returns an error if the encoder or the writer fails.
pub fn encode_png<W: Write>(frame: &[u32], width: u32, height: u32, out: W) -> Result<(), CaptureError> {
    let mut encoder = png::Encoder::new(out, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let mut rgba = Vec::with_capacity(frame.len() * 4);
    for &pixel in frame {
        let [b, g, r, _] = pixel.to_le_bytes();
        rgba.extend_from_slice(&[r, g, b, 0xFF]);
    }

    writer.write_image_data(&rgba)?;
    Ok(())
}

/// Save the last complete frame of `vic` to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_screenshot(vic: &Vic, path: &Path) -> Result<(), CaptureError> {
    let file = fs::File::create(path)?;
    encode_png(
        vic.framebuffer(),
        vic.framebuffer_width(),
        vic.framebuffer_height(),
        BufWriter::new(file),
    )?;
    log::debug!("VIC-II frame {} saved to {}", vic.frame_count(), path.display());
    Ok(())
}
