//! Pixel transforms and on-wire image encodings
//!
//! Key displays are mounted in different orientations depending on the
//! hardware variant, so images are flipped or rotated in pixel space
//! before encoding. Two encodings exist on the wire: a fixed-header
//! 24-bit BMP for the classic models and JPEG at quality 100 for the
//! newer ones.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::error::{Error, Result};
use crate::profile::{Encoding, ImageFormat, Orientation};

/// BMP file header followed by a bitmap info header, as expected by the
/// classic firmware. The embedded dimensions describe a 72x72 image but
/// are ignored by the device; the pixel data that follows is
/// authoritative, which lets the same header serve the 80x80 Mini.
const BMP_HEADER: [u8; 54] = [
    0x42, 0x4d, 0xf6, 0x3c, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x36, 0x00, 0x00, 0x00, 0x28, 0x00, //
    0x00, 0x00, 0x48, 0x00, 0x00, 0x00, 0x48, 0x00, //
    0x00, 0x00, 0x01, 0x00, 0x18, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0xc0, 0x3c, 0x00, 0x00, 0xc4, 0x0e, //
    0x00, 0x00, 0xc4, 0x0e, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Applies the format's orientation transform and encodes the result.
pub fn encode(img: &DynamicImage, format: &ImageFormat) -> Result<Vec<u8>> {
    let oriented = orient(img, format.orientation);
    match format.encoding {
        Encoding::Bmp24 => to_bmp(&oriented),
        Encoding::JpegQ100 => to_jpeg(&oriented),
    }
}

/// Transforms the image to match the physical mounting of the display.
pub fn orient(img: &DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::None => img.clone(),
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::FlipBoth => img.rotate180(),
        Orientation::RotateCcw90 => img.rotate270(),
    }
}

/// Encodes the image as the fixed-header 24-bit BMP: rows top to bottom,
/// each pixel written B,G,R without alpha.
pub fn to_bmp(img: &DynamicImage) -> Result<Vec<u8>> {
    let rgb = img.to_rgb8();

    let mut buffer = Vec::with_capacity(BMP_HEADER.len() + rgb.len());
    buffer.extend_from_slice(&BMP_HEADER);
    for pixel in rgb.pixels() {
        buffer.push(pixel[2]);
        buffer.push(pixel[1]);
        buffer.push(pixel[0]);
    }
    Ok(buffer)
}

/// Encodes the image as JPEG at quality 100.
pub fn to_jpeg(img: &DynamicImage) -> Result<Vec<u8>> {
    let rgb = img.to_rgb8();

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, 100)
        .encode_image(&rgb)
        .map_err(|e| Error::EncodingFailed(e.to_string()))?;
    Ok(buffer)
}
