use crate::document::Page;
use crate::result::LoginCandidate;
use scraper::{ElementRef, Selector};
use tracing::debug;

const SOURCE_TEXT_LIMIT: usize = 50;

/// Login candidates signalled by the page's anchors and form buttons.
///
/// An anchor matches when its text, `aria-label` or `title` mentions a
/// keyword, or when its href contains a keyword with whitespace written as a
/// hyphen or dropped. A button matches on its text (or `value`) and
/// `aria-label`; it yields the action of its enclosing form, so buttons
/// outside a form, or in a form without an action, yield nothing.
///
/// Results are in scan order and may contain duplicate URLs.
pub fn scan_login_links(page: &Page, keywords: &[String]) -> Vec<LoginCandidate> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let href_keywords: Vec<String> = keywords
        .iter()
        .flat_map(|k| [hyphenate(k), k.split_whitespace().collect::<String>()])
        .collect();

    let document = page.document();
    let mut candidates = Vec::new();

    let link_selector = Selector::parse("a[href]").unwrap();
    for link in document.select(&link_selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let text = visible_text(&link);
        let aria_label = link.value().attr("aria-label").unwrap_or_default();
        let title = link.value().attr("title").unwrap_or_default();

        let combined = format!("{} {} {}", text, aria_label, title).to_lowercase();
        let href_lower = href.to_lowercase();

        let is_login_link = contains_any(&combined, &keywords);
        let href_contains_login = contains_any(&href_lower, &href_keywords);

        if !(is_login_link || href_contains_login) {
            continue;
        }

        let Some(url) = page.resolve(href) else {
            debug!("Skipping unresolvable login href: {}", href);
            continue;
        };

        let label = [text.as_str(), aria_label.trim(), title.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or("Login link");
        debug!("Found login link: {} ({})", url, label);
        candidates.push(LoginCandidate::new(
            url,
            format!("Found in link: \"{}\"", truncate(label)),
        ));
    }

    let button_selector =
        Selector::parse(r#"button, input[type="button"], input[type="submit"]"#).unwrap();
    for button in document.select(&button_selector) {
        let text = match visible_text(&button) {
            text if text.is_empty() => button
                .value()
                .attr("value")
                .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
                .unwrap_or_default(),
            text => text,
        };
        let aria_label = button.value().attr("aria-label").unwrap_or_default();
        let combined = format!("{} {}", text, aria_label).to_lowercase();

        if !contains_any(&combined, &keywords) {
            continue;
        }

        let Some(action) = enclosing_form(&button)
            .and_then(|form| form.value().attr("action"))
            .filter(|action| !action.trim().is_empty())
        else {
            debug!("Login button \"{}\" has no form action", text);
            continue;
        };

        if let Some(url) = page.resolve(action) {
            debug!("Found login form: {} ({})", url, text);
            candidates.push(LoginCandidate::new(
                url,
                format!("Found in form with button: \"{}\"", truncate(&text)),
            ));
        }
    }

    candidates
}

fn hyphenate(keyword: &str) -> String {
    keyword.split_whitespace().collect::<Vec<_>>().join("-")
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|needle| !needle.is_empty() && haystack.contains(needle.as_str()))
}

/// Text content with runs of whitespace collapsed to single spaces.
fn visible_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn enclosing_form<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "form")
}

fn truncate(text: &str) -> String {
    text.chars().take(SOURCE_TEXT_LIMIT).collect()
}
