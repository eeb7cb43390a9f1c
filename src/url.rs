use regex::Regex;
use std::sync::OnceLock;

fn youtube_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"^(https?://(?:www\.|m\.|music\.)?youtube\.com/watch\?v=[a-zA-Z0-9_-]+)",
            r"^(https?://youtu\.be/[a-zA-Z0-9_-]+)",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Reduce a YouTube URL to its video part, dropping playlist and tracking
/// parameters. Anything that is not a recognised YouTube URL is returned
/// unchanged.
pub fn clean_youtube_url(url: &str) -> String {
    let url = url.trim();
    youtube_patterns()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_watch_url() {
        assert_eq!(
            clean_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123&t=42s"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(
            clean_youtube_url("https://music.youtube.com/watch?v=abc_-1"),
            "https://music.youtube.com/watch?v=abc_-1"
        );
    }

    #[test]
    fn test_clean_short_url() {
        assert_eq!(
            clean_youtube_url("  https://youtu.be/dQw4w9WgXcQ?si=xyz "),
            "https://youtu.be/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_other_urls_pass_through() {
        assert_eq!(
            clean_youtube_url("https://vimeo.com/12345"),
            "https://vimeo.com/12345"
        );
        assert_eq!(
            clean_youtube_url("https://www.youtube.com/playlist?list=PL123"),
            "https://www.youtube.com/playlist?list=PL123"
        );
    }
}
