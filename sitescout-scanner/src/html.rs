use crate::document::Page;
use scraper::Selector;
use tracing::debug;

const FEED_TYPES: [&str; 2] = ["application/rss+xml", "application/atom+xml"];

/// Feeds and sitemaps the page declares through `<link>` elements.
///
/// Alternate feed links come first, then `rel="sitemap"` links, each in
/// document order. Links without an href, or with one that does not resolve,
/// are skipped.
pub fn scan_resource_links(page: &Page) -> Vec<String> {
    let document = page.document();
    let mut found = Vec::new();

    let alternate_selector = Selector::parse(r#"link[rel="alternate"]"#).unwrap();
    for element in document.select(&alternate_selector) {
        let is_feed = element
            .value()
            .attr("type")
            .is_some_and(|t| FEED_TYPES.contains(&t));

        if is_feed
            && let Some(href) = element.value().attr("href")
            && let Some(url) = page.resolve(href)
        {
            debug!("Found feed link: {}", url);
            found.push(url);
        }
    }

    let sitemap_selector = Selector::parse(r#"link[rel="sitemap"]"#).unwrap();
    for element in document.select(&sitemap_selector) {
        if let Some(href) = element.value().attr("href")
            && let Some(url) = page.resolve(href)
        {
            debug!("Found sitemap link: {}", url);
            found.push(url);
        }
    }

    found
}
