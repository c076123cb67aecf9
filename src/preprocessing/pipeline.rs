use crate::error::OcrError;
use image::DynamicImage;
use serde::Serialize;
use std::time::Instant;

use super::steps;

/// Denoising filter applied before sharpening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DenoiseMethod {
    /// Skip denoising
    #[default]
    None,
    /// 3x3 median filter, effective against sensor salt-and-pepper noise
    Median,
    /// Gaussian blur matching a 5x5 kernel
    Gaussian,
    /// Non-local means, patch-based (strength 10, template 7, search 21)
    NonLocalMeans,
    /// Edge-preserving bilateral filter (diameter 9, sigmas 75)
    Bilateral,
}

impl DenoiseMethod {
    /// Parse from a form/query parameter string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "median" => Some(Self::Median),
            "gaussian" => Some(Self::Gaussian),
            "nlmeans" => Some(Self::NonLocalMeans),
            "bilateral" => Some(Self::Bilateral),
            _ => None,
        }
    }

    /// Get the method name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Median => "median",
            Self::Gaussian => "gaussian",
            Self::NonLocalMeans => "nlmeans",
            Self::Bilateral => "bilateral",
        }
    }
}

/// Preprocessing options for a single request.
///
/// The default configuration disables every optional step; processing then
/// amounts to grayscale conversion (itself skipped for single-channel input).
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessConfig {
    pub denoise: DenoiseMethod,
    pub sharpen: bool,
    pub binarize: bool,
    pub upscale_factor: u32,
    pub contrast_factor: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            denoise: DenoiseMethod::None,
            sharpen: false,
            binarize: false,
            upscale_factor: 1,
            contrast_factor: 1.0,
        }
    }
}

impl PreprocessConfig {
    fn validate(&self) -> Result<(), OcrError> {
        if self.upscale_factor < 1 {
            return Err(OcrError::InvalidConfig(
                "upscale factor must be at least 1".to_string(),
            ));
        }
        if !self.contrast_factor.is_finite() || self.contrast_factor < 0.0 {
            return Err(OcrError::InvalidConfig(format!(
                "contrast factor must be a non-negative number, got {}",
                self.contrast_factor
            )));
        }
        Ok(())
    }
}

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessResult {
    /// Preprocessed image (not serialized)
    #[serde(skip)]
    pub image: DynamicImage,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Preprocessing pipeline that applies the configured steps in fixed order:
/// grayscale, denoise, sharpen, binarize, upscale, contrast.
#[derive(Debug)]
pub struct Pipeline {
    config: PreprocessConfig,
}

impl Pipeline {
    pub fn new(config: PreprocessConfig) -> Result<Self, OcrError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Process an image according to the configured options.
    ///
    /// Returns a new image; the pipeline retains nothing once this returns.
    /// Output is deterministic for identical input and configuration.
    pub fn process(&self, image: DynamicImage) -> Result<PreprocessResult, OcrError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(OcrError::InvalidImage(format!(
                "image has zero dimension ({}x{})",
                image.width(),
                image.height()
            )));
        }

        let start = Instant::now();
        let mut steps_timing = Vec::new();

        let mut img = image;

        img = self.run_step("grayscale", img, &mut steps_timing, steps::grayscale::apply)?;

        if self.config.denoise != DenoiseMethod::None {
            let method = self.config.denoise;
            img = self.run_step("denoise", img, &mut steps_timing, |i| {
                steps::denoise::apply(i, method)
            })?;
        }

        if self.config.sharpen {
            img = self.run_step("sharpen", img, &mut steps_timing, steps::sharpen::apply)?;
        }

        if self.config.binarize {
            img = self.run_step("binarize", img, &mut steps_timing, steps::threshold::apply)?;
        }

        if self.config.upscale_factor > 1 {
            let factor = self.config.upscale_factor;
            img = self.run_step("upscale", img, &mut steps_timing, |i| {
                steps::upscale::apply(i, factor)
            })?;
        }

        if self.config.contrast_factor != 1.0 {
            let factor = self.config.contrast_factor;
            img = self.run_step("contrast", img, &mut steps_timing, |i| {
                steps::contrast::apply(i, factor)
            })?;
        }

        Ok(PreprocessResult {
            image: img,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: steps_timing,
        })
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: DynamicImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<DynamicImage, OcrError>
    where
        F: FnOnce(DynamicImage) -> Result<DynamicImage, OcrError>,
    {
        let step_start = Instant::now();
        let result = step_fn(img)?;
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms: step_start.elapsed().as_millis() as u64,
        });
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn gray_gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
            Luma([((x * 7 + y * 13) % 256) as u8])
        }))
    }

    #[test]
    fn test_rejects_zero_dimension_image() {
        let pipeline = Pipeline::new(PreprocessConfig::default()).unwrap();
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let err = pipeline.process(empty).unwrap_err();
        assert!(matches!(err, OcrError::InvalidImage(_)));
    }

    #[test]
    fn test_rejects_invalid_factors() {
        let config = PreprocessConfig {
            upscale_factor: 0,
            ..Default::default()
        };
        assert!(matches!(
            Pipeline::new(config).unwrap_err(),
            OcrError::InvalidConfig(_)
        ));

        let config = PreprocessConfig {
            contrast_factor: -0.5,
            ..Default::default()
        };
        assert!(matches!(
            Pipeline::new(config).unwrap_err(),
            OcrError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_default_config_is_identity_for_grayscale_input() {
        let input = gray_gradient(20, 10);
        let pipeline = Pipeline::new(PreprocessConfig::default()).unwrap();
        let result = pipeline.process(input.clone()).unwrap();

        assert_eq!(result.image.to_luma8().as_raw(), input.to_luma8().as_raw());
        assert_eq!(result.steps.len(), 1); // grayscale only, and it passed through
    }

    #[test]
    fn test_default_config_converts_color_to_grayscale() {
        let mut img = RgbImage::new(8, 8);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        let pipeline = Pipeline::new(PreprocessConfig::default()).unwrap();
        let result = pipeline.process(DynamicImage::ImageRgb8(img)).unwrap();

        assert!(matches!(result.image, DynamicImage::ImageLuma8(_)));
        assert_eq!(result.image.width(), 8);
        assert_eq!(result.image.height(), 8);
    }

    #[test]
    fn test_output_dimensions_scale_by_upscale_factor() {
        let config = PreprocessConfig {
            upscale_factor: 3,
            ..Default::default()
        };
        let pipeline = Pipeline::new(config).unwrap();
        let result = pipeline.process(gray_gradient(40, 25)).unwrap();

        assert_eq!(result.image.width(), 120);
        assert_eq!(result.image.height(), 75);
    }

    #[test]
    fn test_processing_is_deterministic() {
        let config = PreprocessConfig {
            denoise: DenoiseMethod::Gaussian,
            sharpen: true,
            binarize: true,
            upscale_factor: 2,
            contrast_factor: 1.5,
        };
        let input = gray_gradient(30, 20);

        let first = Pipeline::new(config.clone())
            .unwrap()
            .process(input.clone())
            .unwrap();
        let second = Pipeline::new(config).unwrap().process(input).unwrap();

        assert_eq!(
            first.image.to_luma8().as_raw(),
            second.image.to_luma8().as_raw()
        );
    }

    #[test]
    fn test_binarize_white_image_stays_white() {
        // 100x50 all-white input with only binarization enabled must come out
        // 100x50, single-channel, strictly 0/255, background still white
        let white = DynamicImage::ImageLuma8(GrayImage::from_pixel(100, 50, Luma([255])));
        let config = PreprocessConfig {
            binarize: true,
            ..Default::default()
        };
        let result = Pipeline::new(config).unwrap().process(white).unwrap();

        assert_eq!(result.image.width(), 100);
        assert_eq!(result.image.height(), 50);
        let gray = match &result.image {
            DynamicImage::ImageLuma8(buf) => buf,
            other => panic!("expected single-channel output, got {:?}", other.color()),
        };
        for pixel in gray.pixels() {
            assert_eq!(pixel.0[0], 255);
        }
    }

    #[test]
    fn test_step_timings_match_enabled_steps() {
        let config = PreprocessConfig {
            denoise: DenoiseMethod::Median,
            sharpen: true,
            binarize: true,
            upscale_factor: 2,
            contrast_factor: 2.0,
        };
        let result = Pipeline::new(config)
            .unwrap()
            .process(gray_gradient(16, 16))
            .unwrap();

        let names: Vec<&str> = result.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["grayscale", "denoise", "sharpen", "binarize", "upscale", "contrast"]
        );
    }

    #[test]
    fn test_denoise_method_parsing() {
        assert_eq!(DenoiseMethod::from_str("none"), Some(DenoiseMethod::None));
        assert_eq!(
            DenoiseMethod::from_str("NLMeans"),
            Some(DenoiseMethod::NonLocalMeans)
        );
        assert_eq!(
            DenoiseMethod::from_str("bilateral"),
            Some(DenoiseMethod::Bilateral)
        );
        assert_eq!(DenoiseMethod::from_str("blur"), None);
    }
}
