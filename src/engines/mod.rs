//! OCR engine implementations
//!
//! This module contains implementations of the OcrEngine trait. The service
//! ships a single engine driving the external tesseract binary.

pub mod tesseract;

pub use tesseract::TesseractEngine;
