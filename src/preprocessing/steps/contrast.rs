use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};

/// Mid-gray reference point for contrast scaling
const MID: f32 = 128.0;

/// Scale each pixel's deviation from mid-gray by the given factor, clamped
/// to the valid sample range. Factor 1.0 is a no-op, factor 0.0 flattens the
/// image to mid-gray.
pub fn apply(image: DynamicImage, factor: f32) -> Result<DynamicImage, OcrError> {
    if factor == 1.0 {
        return Ok(image);
    }

    let gray = image.to_luma8();
    let adjusted = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y).0[0] as f32;
        let value = MID + factor * (pixel - MID);
        Luma([value.round().clamp(0.0, 255.0) as u8])
    });

    Ok(DynamicImage::ImageLuma8(adjusted))
}
