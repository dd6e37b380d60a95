//! Image extraction: media attachments from feed entries, with an article
//! page fallback that scrapes Open Graph and Twitter card meta tags.

use feed_rs::model::Entry;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::TARGET_WEB_REQUEST;

/// Pulls an image URL out of a feed entry's media attachments, if any. Media
/// content is preferred over thumbnails.
pub fn image_from_entry(entry: &Entry) -> Option<String> {
    for media in &entry.media {
        for content in &media.content {
            let is_image = content
                .content_type
                .as_ref()
                .map(|media_type| media_type.ty().as_str() == "image")
                .unwrap_or(false);
            if is_image {
                if let Some(url) = &content.url {
                    debug!("Found image in feed media content: {}", url);
                    return Some(url.to_string());
                }
            }
        }
        if let Some(thumbnail) = media.thumbnails.first() {
            debug!("Found image in feed thumbnail: {}", thumbnail.image.uri);
            return Some(thumbnail.image.uri.clone());
        }
    }
    None
}

// Both attribute orders occur in the wild.
static OG_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<meta[^>]+property\s*=\s*["']og:image["'][^>]+content\s*=\s*["']([^"']+)["']"#,
    )
    .unwrap()
});
static OG_IMAGE_REVERSED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<meta[^>]+content\s*=\s*["']([^"']+)["'][^>]+property\s*=\s*["']og:image["']"#,
    )
    .unwrap()
});
static TWITTER_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<meta[^>]+name\s*=\s*["']twitter:image["'][^>]+content\s*=\s*["']([^"']+)["']"#,
    )
    .unwrap()
});
static TWITTER_IMAGE_REVERSED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<meta[^>]+content\s*=\s*["']([^"']+)["'][^>]+name\s*=\s*["']twitter:image["']"#,
    )
    .unwrap()
});

fn meta_image(html: &str) -> Option<String> {
    for pattern in [&*OG_IMAGE, &*OG_IMAGE_REVERSED, &*TWITTER_IMAGE, &*TWITTER_IMAGE_REVERSED] {
        if let Some(captures) = pattern.captures(html) {
            return Some(captures[1].to_string());
        }
    }
    None
}

fn resolve(image_url: &str, page_url: &str) -> Option<String> {
    if image_url.starts_with("http://") || image_url.starts_with("https://") {
        return Some(image_url.to_string());
    }
    Url::parse(page_url)
        .ok()?
        .join(image_url)
        .ok()
        .map(|url| url.to_string())
}

/// Fetches article pages and scrapes a preview image. Every failure path
/// returns None; image extraction never fails a post.
pub struct ImageExtractor {
    client: Client,
    enabled: bool,
    request_timeout: Duration,
}

impl ImageExtractor {
    pub fn new(config: &Config) -> Self {
        ImageExtractor {
            client: Client::new(),
            enabled: config.enable_image_fetching,
            request_timeout: config.request_timeout,
        }
    }

    pub async fn from_page(&self, article_url: &str) -> Option<String> {
        if !self.enabled || article_url.is_empty() {
            return None;
        }

        debug!(target: TARGET_WEB_REQUEST, "Fetching page for image: {}", article_url);

        let response = match timeout(self.request_timeout, self.client.get(article_url).send()).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                warn!(target: TARGET_WEB_REQUEST, "Failed to fetch article page {}: {}", article_url, err);
                return None;
            }
            Err(_) => {
                warn!(target: TARGET_WEB_REQUEST, "Timed out fetching article page {}", article_url);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                target: TARGET_WEB_REQUEST,
                "Article page {} returned status {}", article_url, response.status()
            );
            return None;
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();
        if !content_type.contains("html") {
            debug!(
                target: TARGET_WEB_REQUEST,
                "Skipping image parse for {}: content type {}", article_url, content_type
            );
            return None;
        }

        let html = match response.text().await {
            Ok(html) => html,
            Err(err) => {
                warn!(target: TARGET_WEB_REQUEST, "Failed to read article page {}: {}", article_url, err);
                return None;
            }
        };

        match meta_image(&html).and_then(|image| resolve(&image, article_url)) {
            Some(image_url) => {
                info!("Found preview image for {}: {}", article_url, image_url);
                Some(image_url)
            }
            None => {
                debug!("No image meta tags found on page: {}", article_url);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn og_image_is_extracted() {
        let html = r#"<html><head>
            <meta property="og:image" content="https://cdn.example.com/a.jpg"/>
        </head></html>"#;
        assert_eq!(
            meta_image(html).as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
    }

    #[test]
    fn reversed_attribute_order_is_handled() {
        let html = r#"<meta content="https://cdn.example.com/b.png" property="og:image">"#;
        assert_eq!(
            meta_image(html).as_deref(),
            Some("https://cdn.example.com/b.png")
        );
    }

    #[test]
    fn twitter_image_is_the_fallback() {
        let html = r#"<meta name="twitter:image" content="https://cdn.example.com/c.webp">"#;
        assert_eq!(
            meta_image(html).as_deref(),
            Some("https://cdn.example.com/c.webp")
        );
    }

    #[test]
    fn og_image_wins_over_twitter_image() {
        let html = r#"
            <meta name="twitter:image" content="https://cdn.example.com/tw.jpg">
            <meta property="og:image" content="https://cdn.example.com/og.jpg">
        "#;
        assert_eq!(
            meta_image(html).as_deref(),
            Some("https://cdn.example.com/og.jpg")
        );
    }

    #[test]
    fn relative_urls_resolve_against_the_page() {
        assert_eq!(
            resolve("/img/cover.jpg", "https://example.com/posts/1").as_deref(),
            Some("https://example.com/img/cover.jpg")
        );
        assert_eq!(
            resolve("https://cdn.example.com/x.jpg", "https://example.com/posts/1").as_deref(),
            Some("https://cdn.example.com/x.jpg")
        );
    }

    #[test]
    fn pages_without_meta_tags_yield_nothing() {
        assert!(meta_image("<html><body>plain page</body></html>").is_none());
    }

    #[test]
    fn typed_media_content_is_recognized_as_an_image() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>t</title>
    <item>
      <title>story</title>
      <link>https://example.com/story</link>
      <media:content url="https://cdn.example.com/full.jpg" type="image/jpeg"/>
    </item>
  </channel>
</rss>"#;
        let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();
        let image = image_from_entry(&feed.entries[0]);
        assert_eq!(image.as_deref(), Some("https://cdn.example.com/full.jpg"));
    }

    #[test]
    fn non_image_media_content_is_ignored() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>t</title>
    <item>
      <title>story</title>
      <link>https://example.com/story</link>
      <media:content url="https://cdn.example.com/clip.mp4" type="video/mp4"/>
    </item>
  </channel>
</rss>"#;
        let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();
        assert!(image_from_entry(&feed.entries[0]).is_none());
    }

    #[test]
    fn media_thumbnail_is_extracted_from_a_feed_entry() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>t</title>
    <item>
      <title>story</title>
      <link>https://example.com/story</link>
      <media:thumbnail url="https://cdn.example.com/thumb.jpg"/>
    </item>
  </channel>
</rss>"#;
        let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();
        let image = image_from_entry(&feed.entries[0]);
        assert_eq!(image.as_deref(), Some("https://cdn.example.com/thumb.jpg"));
    }
}
