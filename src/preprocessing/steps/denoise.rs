use crate::error::OcrError;
use crate::preprocessing::pipeline::DenoiseMethod;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::{gaussian_blur_f32, median_filter};

/// Sigma equivalent to a 5x5 Gaussian kernel
const GAUSSIAN_SIGMA: f32 = 1.1;

/// Non-local means smoothing strength
const NLM_STRENGTH: f32 = 10.0;
/// Non-local means patch side length
const NLM_TEMPLATE: i32 = 7;
/// Non-local means search window side length
const NLM_SEARCH: i32 = 21;

/// Bilateral filter diameter
const BILATERAL_DIAMETER: i32 = 9;
/// Bilateral intensity sigma
const BILATERAL_SIGMA_COLOR: f32 = 75.0;
/// Bilateral spatial sigma
const BILATERAL_SIGMA_SPACE: f32 = 75.0;

/// Apply the selected denoising filter to a grayscale image
pub fn apply(image: DynamicImage, method: DenoiseMethod) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    let denoised = match method {
        DenoiseMethod::None => gray,
        // 3x3 median (radius 1), effective for salt-and-pepper noise
        DenoiseMethod::Median => median_filter(&gray, 1, 1),
        DenoiseMethod::Gaussian => gaussian_blur_f32(&gray, GAUSSIAN_SIGMA),
        DenoiseMethod::NonLocalMeans => non_local_means(&gray),
        DenoiseMethod::Bilateral => bilateral(&gray),
    };
    Ok(DynamicImage::ImageLuma8(denoised))
}

/// Read a pixel with coordinates clamped to the image bounds
fn pixel_clamped(img: &GrayImage, x: i32, y: i32) -> f32 {
    let x = x.clamp(0, img.width() as i32 - 1) as u32;
    let y = y.clamp(0, img.height() as i32 - 1) as u32;
    img.get_pixel(x, y).0[0] as f32
}

/// Non-local means denoising.
///
/// Each output pixel is a weighted average over every candidate in the search
/// window, weighted by the similarity of the 7x7 patches around the pixel and
/// the candidate. Similar patches anywhere in the window contribute, which
/// smooths flat regions without washing out repeated glyph strokes.
fn non_local_means(img: &GrayImage) -> GrayImage {
    let half_patch = NLM_TEMPLATE / 2;
    let half_search = NLM_SEARCH / 2;
    let patch_area = (NLM_TEMPLATE * NLM_TEMPLATE) as f32;
    let h2 = NLM_STRENGTH * NLM_STRENGTH;

    GrayImage::from_fn(img.width(), img.height(), |cx, cy| {
        let (cx, cy) = (cx as i32, cy as i32);
        let mut weight_sum = 0.0f32;
        let mut value_sum = 0.0f32;

        for qy in (cy - half_search)..=(cy + half_search) {
            for qx in (cx - half_search)..=(cx + half_search) {
                let mut dist = 0.0f32;
                for dy in -half_patch..=half_patch {
                    for dx in -half_patch..=half_patch {
                        let d = pixel_clamped(img, cx + dx, cy + dy)
                            - pixel_clamped(img, qx + dx, qy + dy);
                        dist += d * d;
                    }
                }
                let weight = (-(dist / patch_area) / h2).exp();
                weight_sum += weight;
                value_sum += weight * pixel_clamped(img, qx, qy);
            }
        }

        Luma([(value_sum / weight_sum).round().clamp(0.0, 255.0) as u8])
    })
}

/// Bilateral filtering: a Gaussian blur whose weights also fall off with
/// intensity difference, so smoothing stops at glyph edges.
fn bilateral(img: &GrayImage) -> GrayImage {
    let radius = BILATERAL_DIAMETER / 2;
    let space_denom = 2.0 * BILATERAL_SIGMA_SPACE * BILATERAL_SIGMA_SPACE;
    let color_denom = 2.0 * BILATERAL_SIGMA_COLOR * BILATERAL_SIGMA_COLOR;

    GrayImage::from_fn(img.width(), img.height(), |cx, cy| {
        let (cx, cy) = (cx as i32, cy as i32);
        let center = pixel_clamped(img, cx, cy);
        let mut weight_sum = 0.0f32;
        let mut value_sum = 0.0f32;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let value = pixel_clamped(img, cx + dx, cy + dy);
                let spatial = ((dx * dx + dy * dy) as f32) / space_denom;
                let diff = value - center;
                let range = (diff * diff) / color_denom;
                let weight = (-(spatial + range)).exp();
                weight_sum += weight;
                value_sum += weight * value;
            }
        }

        Luma([(value_sum / weight_sum).round().clamp(0.0, 255.0) as u8])
    })
}
