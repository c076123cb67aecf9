use crate::error::OcrError;
use image::{imageops::FilterType, DynamicImage};

/// Upscale by an integer factor with Lanczos resampling.
/// Low-resolution signboard crops often sit below the glyph size the engine
/// recognizes reliably; a factor of 1 is a no-op.
pub fn apply(image: DynamicImage, factor: u32) -> Result<DynamicImage, OcrError> {
    if factor <= 1 {
        return Ok(image);
    }

    let width = image.width() * factor;
    let height = image.height() * factor;
    Ok(image.resize_exact(width, height, FilterType::Lanczos3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_upscale_multiplies_dimensions() {
        let img = GrayImage::new(100, 40);
        let result = apply(DynamicImage::ImageLuma8(img), 2).unwrap();
        assert_eq!(result.width(), 200);
        assert_eq!(result.height(), 80);
    }

    #[test]
    fn test_factor_one_is_identity() {
        let img = GrayImage::from_fn(10, 10, |x, y| Luma([(x + y) as u8]));
        let result = apply(DynamicImage::ImageLuma8(img.clone()), 1).unwrap();
        assert_eq!(result.to_luma8().as_raw(), img.as_raw());
    }

    #[test]
    fn test_upscale_preserves_uniform_value() {
        let img = GrayImage::from_pixel(8, 8, Luma([200]));
        let result = apply(DynamicImage::ImageLuma8(img), 3).unwrap();
        for pixel in result.to_luma8().pixels() {
            assert_eq!(pixel.0[0], 200);
        }
    }
}
