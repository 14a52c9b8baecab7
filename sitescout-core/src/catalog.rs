// Path catalogs and keywords driving discovery

use std::fs;
use std::path::Path;

pub const SITEMAP_PATHS: [&str; 19] = [
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/sitemap1.xml",
    "/sitemap",
    "/sitemaps.xml",
    "/sitemap-news.xml",
    "/post-sitemap.xml",
    "/news-sitemap.xml",
    "/sitemap_news.xml",
    "/googlenews.xml",
    "/google-news.xml",
    "/sitemap_google.xml",
    "/google-sitemap.xml",
    "/sitemap-actu.xml",
    "/sitemap-actualites.xml",
    "/sitemap-articles.xml",
    "/plan-du-site.xml",
    "/plan-site.xml",
];

pub const FEED_PATHS: [&str; 12] = [
    "/feed",
    "/rss",
    "/feed.xml",
    "/rss.xml",
    "/atom.xml",
    "/feed/",
    "/rss/",
    "/blog/feed",
    "/blog/rss",
    "/news/feed",
    "/news/rss",
    "/index.xml",
];

pub const LOGIN_PATHS: [&str; 19] = [
    "/login",
    "/signin",
    "/sign-in",
    "/log-in",
    "/auth",
    "/authenticate",
    "/account/login",
    "/user/login",
    "/member/login",
    "/members/login",
    "/wp-login.php",
    "/wp-admin",
    "/admin/login",
    "/admin",
    "/connexion",
    "/se-connecter",
    "/compte/connexion",
    "/utilisateur/connexion",
    "/membre/connexion",
];

/// English and French terms that mark a login link or button.
pub const LOGIN_KEYWORDS: [&str; 12] = [
    "login",
    "log in",
    "signin",
    "sign in",
    "log-in",
    "sign-in",
    "connexion",
    "se connecter",
    "connecter",
    "se-connecter",
    "mon compte",
    "espace membre",
];

/// Everything discovery probes for or matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryCatalog {
    pub sitemap_paths: Vec<String>,
    pub feed_paths: Vec<String>,
    pub login_paths: Vec<String>,
    pub login_keywords: Vec<String>,
}

impl Default for DiscoveryCatalog {
    fn default() -> Self {
        Self {
            sitemap_paths: to_owned(&SITEMAP_PATHS),
            feed_paths: to_owned(&FEED_PATHS),
            login_paths: to_owned(&LOGIN_PATHS),
            login_keywords: to_owned(&LOGIN_KEYWORDS),
        }
    }
}

impl DiscoveryCatalog {
    /// A catalog with nothing to probe and no keywords.
    pub fn empty() -> Self {
        Self {
            sitemap_paths: Vec::new(),
            feed_paths: Vec::new(),
            login_paths: Vec::new(),
            login_keywords: Vec::new(),
        }
    }

    pub fn with_sitemap_paths(mut self, paths: Vec<String>) -> Self {
        self.sitemap_paths = paths;
        self
    }

    pub fn with_feed_paths(mut self, paths: Vec<String>) -> Self {
        self.feed_paths = paths;
        self
    }

    pub fn with_login_paths(mut self, paths: Vec<String>) -> Self {
        self.login_paths = paths;
        self
    }

    pub fn with_login_keywords(mut self, keywords: Vec<String>) -> Self {
        self.login_keywords = keywords;
        self
    }
}

fn to_owned(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|s| s.to_string()).collect()
}

/// Load a catalog list from file, one entry per line
///
/// Blank lines and `#` comments are skipped.
pub fn load_wordlist(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read wordlist {}: {}", path.display(), e))?;

    let words = parse_wordlist(&content);

    if words.is_empty() {
        return Err(format!(
            "Wordlist {} is empty or contains only comments",
            path.display()
        ));
    }

    Ok(words)
}

fn parse_wordlist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Leading-slash form used when building `origin + path` probe URLs.
pub fn normalize_paths(entries: Vec<String>) -> Vec<String> {
    entries
        .into_iter()
        .map(|entry| {
            if entry.starts_with('/') {
                entry
            } else {
                format!("/{}", entry)
            }
        })
        .collect()
}
