use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};

/// Neighborhood side length for the local mean
const BLOCK_SIZE: i32 = 31;
/// Bias subtracted from the local mean before comparison
const OFFSET: f32 = 10.0;
/// Kernel sigma for a 31-tap Gaussian window
const SIGMA: f32 = 5.0;

/// Adaptive binarization against a Gaussian-weighted local mean.
///
/// Each pixel is compared against the weighted mean of its 31x31
/// neighborhood minus a fixed offset, which keeps unevenly lit signboards
/// readable where one global threshold would not. Output is strictly 0/255.
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    let means = local_gaussian_mean(&gray);
    let width = gray.width();

    let binarized = GrayImage::from_fn(width, gray.height(), |x, y| {
        let mean = means[(y * width + x) as usize];
        let pixel = gray.get_pixel(x, y).0[0] as f32;
        if pixel > mean - OFFSET {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });

    Ok(DynamicImage::ImageLuma8(binarized))
}

/// Normalized 31-tap Gaussian kernel
fn gaussian_kernel() -> Vec<f32> {
    let half = BLOCK_SIZE / 2;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|d| (-((d * d) as f32) / (2.0 * SIGMA * SIGMA)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Gaussian-weighted local mean of every pixel, computed as two separable
/// passes with border pixels replicated.
fn local_gaussian_mean(img: &GrayImage) -> Vec<f32> {
    let (width, height) = (img.width() as i32, img.height() as i32);
    let kernel = gaussian_kernel();
    let half = BLOCK_SIZE / 2;

    // Horizontal pass
    let mut horizontal = vec![0.0f32; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (i, w) in kernel.iter().enumerate() {
                let sx = (x + i as i32 - half).clamp(0, width - 1);
                acc += w * img.get_pixel(sx as u32, y as u32).0[0] as f32;
            }
            horizontal[(y * width + x) as usize] = acc;
        }
    }

    // Vertical pass
    let mut means = vec![0.0f32; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (i, w) in kernel.iter().enumerate() {
                let sy = (y + i as i32 - half).clamp(0, height - 1);
                acc += w * horizontal[(sy * width + x) as usize];
            }
            means[(y * width + x) as usize] = acc;
        }
    }

    means
}
