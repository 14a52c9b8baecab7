// Terminal rendering of discovery results

use colored::Colorize;
use sitescout_scanner::{FeedDiscoveryResult, LoginDiscoveryResult};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

pub fn feeds_summary(result: &FeedDiscoveryResult) -> String {
    format!(
        "Found {} sitemaps and {} feeds",
        result.sitemaps.len(),
        result.rss_feeds.len()
    )
}

pub fn login_summary(result: &LoginDiscoveryResult) -> String {
    format!("Found {} login pages", result.login_pages.len())
}

/// Sitemaps (with nested children of indexes), feeds and the robots.txt used.
pub fn generate_feeds_report(result: &FeedDiscoveryResult) -> String {
    let mut report = String::new();
    report.push_str(RULE);
    report.push_str("\n\n");
    report.push_str(&format!("# {}\n", feeds_summary(result)));
    if let Some(ref robots) = result.robots_txt {
        report.push_str(&format!("  robots.txt: {}\n", robots));
    }
    report.push('\n');

    report.push_str(&format!("## Sitemaps ({})\n", result.sitemaps.len()));
    if result.sitemaps.is_empty() {
        report.push_str(&format!("  {}\n", "No sitemaps found".dimmed()));
    }
    for sitemap in &result.sitemaps {
        if sitemap.is_index {
            report.push_str(&format!(
                "  {} {} {}\n",
                "▼".cyan(),
                sitemap.url,
                format!("({} nested sitemaps)", sitemap.children.len()).dimmed()
            ));
            for child in &sitemap.children {
                report.push_str(&format!("      {} {}\n", "└".dimmed(), child));
            }
        } else {
            report.push_str(&format!("  {} {}\n", "•".cyan(), sitemap.url));
        }
    }
    report.push('\n');

    report.push_str(&format!("## Feeds ({})\n", result.rss_feeds.len()));
    if result.rss_feeds.is_empty() {
        report.push_str(&format!("  {}\n", "No RSS feeds found".dimmed()));
    }
    for feed in &result.rss_feeds {
        report.push_str(&format!("  {} {}\n", "•".green(), feed));
    }
    report.push('\n');

    report
}

/// Login candidates with the signal each one came from.
pub fn generate_login_report(result: &LoginDiscoveryResult) -> String {
    let mut report = String::new();
    report.push_str(RULE);
    report.push_str("\n\n");
    report.push_str(&format!("# {}\n\n", login_summary(result)));

    if result.login_pages.is_empty() {
        report.push_str(&format!("  {}\n", "No login pages found".dimmed()));
    }
    for candidate in &result.login_pages {
        report.push_str(&format!("  {} {}\n", "•".yellow(), candidate.url));
        report.push_str(&format!("      {}\n", candidate.source.dimmed()));
    }
    report.push('\n');

    report
}
