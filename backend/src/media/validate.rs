//! Instagram URL validation and content ID extraction

use once_cell::sync::Lazy;
use regex::Regex;

static INSTAGRAM_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(www\.)?(instagram\.com|instagr\.am)/(p|reel|stories|tv)/[A-Za-z0-9_-]+/?(\?.*)?$",
    )
    .expect("instagram url pattern")
});

static CONTENT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(p|reel|stories|tv)/([A-Za-z0-9_-]+)").expect("content id pattern"));

/// Check whether `url` looks like a post, reel, story or IGTV link.
///
/// Purely syntactic; no network access.
pub fn is_valid_url(url: &str) -> bool {
    INSTAGRAM_URL.is_match(url)
}

/// Extract the content identifier that follows `/p/`, `/reel/`, `/stories/` or `/tv/`.
pub fn extract_id(url: &str) -> Option<&str> {
    CONTENT_ID
        .captures(url)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}
