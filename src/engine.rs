use crate::error::OcrError;
use image::DynamicImage;

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "tesseract")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Run recognition over an in-memory image with the given engine options
    /// (e.g., page segmentation flags) and return the raw extracted text.
    fn recognize(&self, image: &DynamicImage, options: &str) -> Result<String, OcrError>;

    /// Get supported upload MIME types
    fn supported_formats(&self) -> Vec<String>;
}
