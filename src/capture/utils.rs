use chrono::{DateTime, Utc};
use std::io::Cursor;

/// Generate a timestamp string in YYYYMMDD_HHMMSS format
pub fn generate_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`
pub fn sanitize_description(description: &str) -> String {
    description
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Artifact file name: `screenshot_<seq>_<description>_<unix millis>.png`
pub fn artifact_name(sequence: u64, description: &str, timestamp: &DateTime<Utc>) -> String {
    format!(
        "screenshot_{:02}_{}_{}.png",
        sequence,
        sanitize_description(description),
        timestamp.timestamp_millis()
    )
}

/// Pixel dimensions of an encoded image, if the format is recognised
pub fn image_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitize_description() {
        assert_eq!(sanitize_description("before_login_click"), "before_login_click");
        assert_eq!(
            sanitize_description("error_message_shown_Amount must be > 0"),
            "error_message_shown_Amount_must_be___0"
        );
        assert_eq!(sanitize_description("a/b\\c-d"), "a_b_c_d");
        assert_eq!(sanitize_description("Zürich"), "Z_rich");
    }

    #[test]
    fn test_artifact_name() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            artifact_name(3, "login page loaded", &ts),
            "screenshot_03_login_page_loaded_1700000000123.png"
        );
        assert_eq!(
            artifact_name(120, "x", &ts),
            "screenshot_120_x_1700000000123.png"
        );
    }

    #[test]
    fn test_image_dimensions_rejects_garbage() {
        assert_eq!(image_dimensions(b"not an image"), None);
    }
}
