use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::MEDIA_BUCKET;

static FEATURED_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/storage/v1/object/public/media/featured/([^?]+)").unwrap());
static CONTENT_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/storage/v1/object/public/media/content/([^?]+)").unwrap());
static MEDIA_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/storage/v1/object/public/media/([^?]+)").unwrap());
static CONTENT_MEDIA_IN_HTML: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s"'()<>]*?/storage/v1/object/public/media/content/([^"'\s)?<>]+)"#)
        .unwrap()
});

/// Recover the `media` bucket key an uploaded image URL points at.
///
/// Known URL shapes are tried first (featured, content, then any media key);
/// if none match, the URL path is split and everything after the `media`
/// segment is used.
pub fn extract_path_from_url(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    if let Some(rest) = FEATURED_URL.captures(url).and_then(|c| c.get(1)) {
        return Some(format!("featured/{}", rest.as_str()));
    }
    if let Some(rest) = CONTENT_URL.captures(url).and_then(|c| c.get(1)) {
        return Some(format!("content/{}", rest.as_str()));
    }
    if let Some(rest) = MEDIA_URL.captures(url).and_then(|c| c.get(1)) {
        return Some(rest.as_str().to_string());
    }
    path_after_media_segment(url)
}

fn path_after_media_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.collect();
    let media_index = segments.iter().position(|s| *s == MEDIA_BUCKET)?;
    let rest = segments[media_index + 1..]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    (!rest.is_empty()).then_some(rest)
}

/// Every `media/content/...` key referenced by an absolute URL inside `html`,
/// in document order.
pub fn extract_media_paths_from_content(html: &str) -> Vec<String> {
    CONTENT_MEDIA_IN_HTML
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|rest| format!("content/{}", rest.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://abc.example.co/storage/v1/object/public/media";

    #[test]
    fn featured_and_content_urls_keep_their_folder() {
        assert_eq!(
            extract_path_from_url(&format!("{BASE}/featured/1-cat.png")).as_deref(),
            Some("featured/1-cat.png")
        );
        assert_eq!(
            extract_path_from_url(&format!("{BASE}/content/2-dog.png?width=300")).as_deref(),
            Some("content/2-dog.png")
        );
    }

    #[test]
    fn other_media_keys_use_the_generic_pattern() {
        assert_eq!(
            extract_path_from_url(&format!("{BASE}/misc/deep/x.gif")).as_deref(),
            Some("misc/deep/x.gif")
        );
    }

    #[test]
    fn unknown_shapes_fall_back_to_path_splitting() {
        assert_eq!(
            extract_path_from_url("https://cdn.example.com/files/media/featured/x.png").as_deref(),
            Some("featured/x.png")
        );
        assert_eq!(extract_path_from_url("https://cdn.example.com/media/"), None);
        assert_eq!(extract_path_from_url("https://cdn.example.com/other/x.png"), None);
        assert_eq!(extract_path_from_url("not a url"), None);
        assert_eq!(extract_path_from_url(""), None);
    }

    #[test]
    fn content_scan_finds_every_embedded_image() {
        let html = format!(
            r#"<p>Intro</p><img src="{BASE}/content/a.png" alt="a"><p><img src="{BASE}/content/b%20c.jpg" alt="b"></p>
            <a href="{BASE}/featured/not-content.png">x</a>"#
        );
        assert_eq!(
            extract_media_paths_from_content(&html),
            vec!["content/a.png".to_string(), "content/b%20c.jpg".to_string()]
        );
    }

    #[test]
    fn content_scan_ignores_relative_and_foreign_urls() {
        let html = r#"<img src="/storage/v1/object/public/media/content/a.png"><img src="https://x.test/img.png">"#;
        assert!(extract_media_paths_from_content(html).is_empty());
    }
}
