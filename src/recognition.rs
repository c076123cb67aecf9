//! Recognition attempt loop
//!
//! Signboard photos defeat any single page-segmentation assumption, so the
//! engine is tried with a short ordered list of segmentation modes and the
//! first attempt that yields text wins.

use crate::engine::OcrEngine;
use crate::error::OcrError;
use image::DynamicImage;

/// Default engine option sets, in priority order: whole-page automatic
/// segmentation, single uniform text block, sparse scattered words.
pub fn default_segmentation_modes() -> Vec<String> {
    vec![
        "--oem 3 --psm 3".to_string(),
        "--oem 3 --psm 6".to_string(),
        "--oem 3 --psm 11".to_string(),
    ]
}

/// Try each engine configuration in order and return the first non-empty
/// trimmed result.
///
/// Attempts are independent; nothing is merged across them. An empty string
/// means every configuration came back blank, which is a valid outcome, not
/// an error. Engine failures (binary missing, bad invocation) propagate.
pub fn recognize_text(
    engine: &dyn OcrEngine,
    image: &DynamicImage,
    configs: &[String],
) -> Result<String, OcrError> {
    for config in configs {
        let text = engine.recognize(image, config)?;
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            tracing::debug!(
                "Recognition succeeded with '{}' ({} chars)",
                config,
                trimmed.len()
            );
            return Ok(trimmed.to_string());
        }
        tracing::debug!("Recognition with '{}' returned no text", config);
    }

    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Engine stub that replays canned responses and counts invocations
    struct MockEngine {
        responses: Vec<Result<String, String>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockEngine {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: responses.iter().map(|r| Ok(r.to_string())).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                responses: vec![Err("binary not found".to_string())],
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl OcrEngine for MockEngine {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn description(&self) -> &'static str {
            "mock engine for tests"
        }

        fn recognize(&self, _image: &DynamicImage, options: &str) -> Result<String, OcrError> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push(options.to_string());
            match &self.responses[index.min(self.responses.len() - 1)] {
                Ok(text) => Ok(text.clone()),
                Err(msg) => Err(OcrError::EngineUnavailable(msg.clone())),
            }
        }

        fn supported_formats(&self) -> Vec<String> {
            vec!["image/png".to_string()]
        }
    }

    fn blank_image() -> DynamicImage {
        DynamicImage::ImageLuma8(image::GrayImage::new(4, 4))
    }

    fn configs(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_first_non_empty_result_wins() {
        let engine = MockEngine::new(&["", "  Stop  ", "never reached"]);
        let result =
            recognize_text(&engine, &blank_image(), &configs(&["A", "B", "C"])).unwrap();

        assert_eq!(result, "Stop");
        // "C" must never be invoked once "B" succeeds
        assert_eq!(engine.call_count(), 2);
    }

    #[test]
    fn test_short_circuits_on_first_config() {
        let engine = MockEngine::new(&["EXIT", "", ""]);
        let result =
            recognize_text(&engine, &blank_image(), &configs(&["A", "B", "C"])).unwrap();

        assert_eq!(result, "EXIT");
        assert_eq!(engine.call_count(), 1);
    }

    #[test]
    fn test_all_blank_returns_empty_string() {
        let engine = MockEngine::new(&["", "   ", "\n\t"]);
        let result =
            recognize_text(&engine, &blank_image(), &configs(&["A", "B", "C"])).unwrap();

        assert_eq!(result, "");
        assert_eq!(engine.call_count(), 3);
    }

    #[test]
    fn test_engine_failure_propagates() {
        let engine = MockEngine::failing();
        let err =
            recognize_text(&engine, &blank_image(), &configs(&["A", "B"])).unwrap_err();

        assert!(matches!(err, OcrError::EngineUnavailable(_)));
        assert_eq!(engine.call_count(), 1);
    }

    #[test]
    fn test_default_modes_are_ordered() {
        let modes = default_segmentation_modes();
        assert_eq!(modes.len(), 3);
        assert!(modes[0].contains("--psm 3"));
        assert!(modes[1].contains("--psm 6"));
        assert!(modes[2].contains("--psm 11"));
    }
}
