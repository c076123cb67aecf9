//! Tesseract engine implementation
//!
//! Drives the external `tesseract` binary. The binary is resolved once when
//! the engine is constructed; each recognition call stages the image through
//! a scoped temp file and reads the text from stdout.

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::OcrError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// OCR engine backed by the tesseract command-line binary
#[derive(Debug)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
}

impl TesseractEngine {
    /// Create a new engine, resolving and probing the tesseract binary.
    ///
    /// Resolution order: explicit path from the configuration (or the
    /// TESSERACT_CMD environment variable via clap), then a PATH lookup.
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        let binary = resolve_binary(config.tesseract_cmd.as_deref())?;

        // Probe the binary so a broken install fails at startup, not per request
        let output = Command::new(&binary)
            .arg("--version")
            .output()
            .map_err(|e| {
                OcrError::EngineUnavailable(format!(
                    "failed to run {}: {}",
                    binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(OcrError::EngineUnavailable(format!(
                "{} --version exited with {}",
                binary.display(),
                output.status
            )));
        }

        // tesseract prints its version banner to stdout on recent releases
        // and to stderr on older ones
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        let version = banner.lines().next().unwrap_or("tesseract").to_string();

        tracing::info!(
            "Tesseract engine initialized ({}, language: {})",
            version,
            config.language
        );

        Ok(Self {
            binary,
            language: config.language.clone(),
        })
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn description(&self) -> &'static str {
        "External tesseract binary driven over its command-line interface"
    }

    fn recognize(&self, image: &image::DynamicImage, options: &str) -> Result<String, OcrError> {
        // Encode to PNG in memory, then stage through a scoped temp file.
        // NamedTempFile removes the file on every exit path, including errors.
        let mut png_data = Vec::new();
        {
            let mut cursor = std::io::Cursor::new(&mut png_data);
            image
                .write_to(&mut cursor, image::ImageFormat::Png)
                .map_err(|e| OcrError::Internal(format!("Failed to encode image: {}", e)))?;
        }

        let mut temp_file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Internal(format!("Failed to create temp file: {}", e)))?;

        temp_file
            .write_all(&png_data)
            .and_then(|_| temp_file.flush())
            .map_err(|e| OcrError::Internal(format!("Failed to write temp file: {}", e)))?;

        tracing::debug!(
            "Running tesseract on {}x{} image with options '{}'",
            image.width(),
            image.height(),
            options
        );

        let output = Command::new(&self.binary)
            .arg(temp_file.path())
            .arg("stdout")
            .args(["-l", self.language.as_str()])
            .args(options.split_whitespace())
            .output()
            .map_err(|e| {
                OcrError::EngineUnavailable(format!(
                    "failed to run {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::EngineUnavailable(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn supported_formats(&self) -> Vec<String> {
        vec![
            "image/png".to_string(),
            "image/jpeg".to_string(),
            "image/gif".to_string(),
            "image/bmp".to_string(),
            "image/webp".to_string(),
            "image/tiff".to_string(),
        ]
    }
}

/// Resolve the tesseract binary path.
///
/// An explicit path must point at an existing file; without one the binary is
/// looked up on PATH.
fn resolve_binary(explicit: Option<&str>) -> Result<PathBuf, OcrError> {
    if let Some(path) = explicit {
        let path = Path::new(path);
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(OcrError::EngineUnavailable(format!(
            "tesseract binary not found at {}",
            path.display()
        )));
    }

    which::which("tesseract").map_err(|_| {
        OcrError::EngineUnavailable(
            "tesseract not found on PATH; install Tesseract OCR or set --tesseract-cmd"
                .to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(tesseract_cmd: Option<&str>) -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            language: "eng".to_string(),
            max_file_size: 1024,
            tesseract_cmd: tesseract_cmd.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_explicit_missing_binary_is_unavailable() {
        let err = resolve_binary(Some("/nonexistent/path/to/tesseract")).unwrap_err();
        assert!(matches!(err, OcrError::EngineUnavailable(_)));
    }

    #[test]
    fn test_engine_construction_fails_without_binary() {
        let config = test_config(Some("/nonexistent/path/to/tesseract"));
        let err = TesseractEngine::new(&config).unwrap_err();
        assert!(matches!(err, OcrError::EngineUnavailable(_)));
    }
}
