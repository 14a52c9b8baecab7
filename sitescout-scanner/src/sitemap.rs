use crate::document::resolve_http;
use crate::error::{Result, ScanError};
use crate::fetch::{FetchMethod, Fetcher};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Expands sitemap index documents into their child sitemap URLs.
pub struct SitemapIndexParser {
    fetcher: Arc<dyn Fetcher>,
}

impl SitemapIndexParser {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Child sitemaps listed by the document at `sitemap_url`, resolved
    /// against that URL.
    ///
    /// Empty when the fetch fails, the status is not 2xx, the body is not
    /// well-formed XML, or the document is a plain `urlset` sitemap.
    pub async fn parse(&self, sitemap_url: &str) -> Vec<String> {
        let base = match Url::parse(sitemap_url) {
            Ok(base) => base,
            Err(e) => {
                debug!("Not expanding {}: {}", sitemap_url, e);
                return Vec::new();
            }
        };

        let response = match self.fetcher.fetch(sitemap_url, FetchMethod::Get).await {
            Ok(response) => response,
            Err(e) => {
                debug!("Could not fetch sitemap {}: {}", sitemap_url, e);
                return Vec::new();
            }
        };

        if !response.ok() {
            debug!("Sitemap {} returned {}", sitemap_url, response.status);
            return Vec::new();
        }

        match parse_index_children(&response.body) {
            Ok(children) => children
                .iter()
                .filter_map(|child| resolve_http(&base, child))
                .collect(),
            Err(e) => {
                warn!("Malformed sitemap {}: {}", sitemap_url, e);
                Vec::new()
            }
        }
    }
}

/// Reads `<sitemap><loc>` values from a sitemap index document.
///
/// Returns an empty list when no `sitemapindex` element is present, and an
/// error when the XML is not well-formed.
pub fn parse_index_children(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut is_index = false;
    let mut children = Vec::new();
    let mut current_loc: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == "sitemapindex" {
                    is_index = true;
                }
                if name == "loc" && stack.last().is_some_and(|parent| parent == "sitemap") {
                    current_loc = Some(String::new());
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"sitemapindex" {
                    is_index = true;
                }
            }
            Ok(Event::End(_)) => {
                if let Some(name) = stack.pop()
                    && name == "loc"
                    && let Some(loc) = current_loc.take()
                {
                    let loc = loc.trim();
                    if !loc.is_empty() {
                        children.push(loc.to_string());
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(ref mut loc) = current_loc {
                    let text = e
                        .unescape()
                        .map_err(|e| ScanError::ParseError(e.to_string()))?;
                    loc.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(ref mut loc) = current_loc {
                    loc.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ScanError::ParseError(format!("XML parse error: {e}"))),
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ScanError::ParseError(format!(
            "unexpected end of document inside <{}>",
            stack.join("><")
        )));
    }

    if !is_index {
        return Ok(Vec::new());
    }

    Ok(children)
}
