use crate::error::{Result, TubesumError};
use regex::Regex;

/// Extract the video id that follows the `v=` query marker of a watch URL.
///
/// The id runs until the next `&` or `#`, so extra query parameters such as
/// timestamps are ignored.
pub fn extract_video_id(url: &str) -> Result<String> {
    let re = Regex::new(r"[?&]v=([^&#\s]+)")
        .map_err(|e| TubesumError::UrlParse(format!("{} ({})", url, e)))?;

    re.captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| TubesumError::UrlParse(url.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        let id = extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_extra_query_parameters() {
        let id = extract_video_id("https://www.youtube.com/watch?v=abc123XYZ_-&t=42s").unwrap();
        assert_eq!(id, "abc123XYZ_-");

        let id = extract_video_id("https://youtube.com/watch?feature=share&v=abc#frag").unwrap();
        assert_eq!(id, "abc");
    }

    #[test]
    fn test_surrounding_whitespace() {
        let id = extract_video_id("  https://m.youtube.com/watch?v=xyz\n").unwrap();
        assert_eq!(id, "xyz");
    }

    #[test]
    fn test_missing_marker() {
        for url in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch",
            "https://www.youtube.com/watch?v=",
            "not a url",
            "",
        ] {
            assert!(
                matches!(extract_video_id(url), Err(TubesumError::UrlParse(_))),
                "{url}"
            );
        }
    }
}
