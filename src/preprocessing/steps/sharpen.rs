use crate::error::OcrError;
use image::DynamicImage;
use imageproc::filter::filter3x3;

/// Apply Laplacian-based sharpening to make glyph edges more distinct
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();

    // Center weight 5, cross neighbors -1 each
    let kernel: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

    let sharpened = filter3x3(&gray, &kernel);
    Ok(DynamicImage::ImageLuma8(sharpened))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_sharpen_enhances_edges() {
        // Left half dark, right half light
        let img = GrayImage::from_fn(20, 10, |x, _| {
            if x < 10 {
                Luma([50])
            } else {
                Luma([200])
            }
        });

        let result = apply(DynamicImage::ImageLuma8(img)).unwrap();
        let result_gray = result.to_luma8();

        let edge_left = result_gray.get_pixel(9, 5).0[0];
        let edge_right = result_gray.get_pixel(10, 5).0[0];

        let original_diff = 200i32 - 50;
        let result_diff = (edge_right as i32 - edge_left as i32).abs();

        assert!(
            result_diff >= original_diff,
            "Edge should be enhanced: {} >= {}",
            result_diff,
            original_diff
        );
    }

    #[test]
    fn test_sharpen_leaves_flat_regions_alone() {
        let img = GrayImage::from_pixel(10, 10, Luma([128]));
        let result = apply(DynamicImage::ImageLuma8(img)).unwrap();
        // 5*128 - 4*128 = 128 away from borders
        assert_eq!(result.to_luma8().get_pixel(5, 5).0[0], 128);
    }
}
