//! Canned guidance derived from recognized signboard text

/// Generate a short interpretation of the signboard based on keyword matches.
/// Matching is case-insensitive over the recognized text.
pub fn generate_guidance(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "No meaningful text found on signboard.".to_string();
    }

    let lower = trimmed.to_lowercase();
    if lower.contains("danger") || lower.contains("warning") {
        return "Warning: This signboard indicates a danger or hazard. Stay safe.".to_string();
    }
    if lower.contains("stop") {
        return "This signboard instructs you to stop immediately.".to_string();
    }
    if lower.contains("parking") {
        return "This signboard is related to parking instructions.".to_string();
    }

    "General signboard detected. Follow the instructions as written.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_reports_nothing_found() {
        assert_eq!(
            generate_guidance("   \n"),
            "No meaningful text found on signboard."
        );
    }

    #[test]
    fn test_hazard_keywords() {
        assert!(generate_guidance("DANGER: high voltage").contains("danger or hazard"));
        assert!(generate_guidance("Warning! wet floor").contains("danger or hazard"));
    }

    #[test]
    fn test_stop_keyword() {
        assert_eq!(
            generate_guidance("STOP"),
            "This signboard instructs you to stop immediately."
        );
    }

    #[test]
    fn test_parking_keyword() {
        assert!(generate_guidance("No Parking 8am-6pm").contains("parking"));
    }

    #[test]
    fn test_fallback_for_other_text() {
        assert_eq!(
            generate_guidance("Welcome to Springfield"),
            "General signboard detected. Follow the instructions as written."
        );
    }
}
