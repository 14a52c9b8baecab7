// Tests for feed, sitemap and login discovery against a mock server

use async_trait::async_trait;
use sitescout_core::catalog::DiscoveryCatalog;
use sitescout_core::feeds::FeedSitemapDiscoverer;
use sitescout_core::login::{COMMON_PATH_SOURCE, LoginPageDiscoverer};
use sitescout_scanner::error::Result;
use sitescout_scanner::{FetchMethod, FetchResponse, Fetcher, HttpFetcher, Page, SitemapNode};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn fetcher() -> Arc<dyn Fetcher> {
    Arc::new(HttpFetcher::with_timeout(5).unwrap())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

async fn mount_head(server: &MockServer, route: &str) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

fn sitemap_index(children: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for child in children {
        xml.push_str(&format!("<sitemap><loc>{}</loc></sitemap>", child));
    }
    xml.push_str("</sitemapindex>");
    xml
}

// ============================================================================
// Feed and Sitemap Discovery Tests
// ============================================================================

#[tokio::test]
async fn test_feed_discovery_merges_all_sources() {
    let server = MockServer::start().await;
    let uri = server.uri();

    let children = vec![format!("{}/post-sitemap.xml", uri), format!("{}/page-sitemap.xml", uri)];

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "User-agent: *\nDisallow: /admin\nSitemap: {uri}/sitemap_index.xml\nSitemap: {uri}/sitemap_index.xml\n"
        )))
        .mount(&server)
        .await;

    mount_head(&server, "/sitemap.xml").await;
    mount_head(&server, "/sitemap_index.xml").await;
    mount_head(&server, "/feed").await;
    mount_head(&server, "/rss.xml").await;

    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_index(&children)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<urlset><url><loc>https://example.com/</loc></url></urlset>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    // Children of an index are listed, never fetched
    Mock::given(method("GET"))
        .and(path("/post-sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let page = Page::parse(
        &format!("{}/articles/today", uri),
        r#"<html><head>
            <link rel="alternate" type="application/rss+xml" href="/feed">
            <link rel="sitemap" href="/sitemap.xml">
        </head><body></body></html>"#,
    )
    .unwrap();

    let catalog = DiscoveryCatalog::empty()
        .with_sitemap_paths(strings(&["/sitemap.xml", "/sitemap_index.xml", "/sitemap-news.xml"]))
        .with_feed_paths(strings(&["/feed", "/rss.xml", "/atom.xml"]));

    let result = FeedSitemapDiscoverer::new(fetcher(), catalog)
        .discover(&page)
        .await
        .unwrap();

    assert_eq!(result.robots_txt, Some(format!("{}/robots.txt", uri)));
    assert_eq!(
        result.sitemaps,
        vec![
            SitemapNode {
                url: format!("{}/sitemap_index.xml", uri),
                children: children.clone(),
                is_index: true,
            },
            SitemapNode {
                url: format!("{}/sitemap.xml", uri),
                children: vec![],
                is_index: false,
            },
        ]
    );
    assert_eq!(
        result.rss_feeds,
        vec![
            format!("{}/feed", uri),
            format!("{}/sitemap.xml", uri),
            format!("{}/rss.xml", uri),
        ]
    );
}

#[tokio::test]
async fn test_feed_discovery_without_robots_txt() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_head(&server, "/sitemap.xml").await;

    let page = Page::parse(&uri, "<html></html>").unwrap();
    let catalog = DiscoveryCatalog::empty()
        .with_sitemap_paths(strings(&["/sitemap.xml", "/sitemaps.xml"]))
        .with_feed_paths(strings(&["/feed"]));

    let result = FeedSitemapDiscoverer::new(fetcher(), catalog)
        .discover(&page)
        .await
        .unwrap();

    assert_eq!(result.robots_txt, None);
    assert_eq!(result.sitemaps.len(), 1);
    assert_eq!(result.sitemaps[0].url, format!("{}/sitemap.xml", uri));
    // GET /sitemap.xml is unmatched, so the node has no children
    assert!(!result.sitemaps[0].is_index);
    assert!(result.rss_feeds.is_empty());
}

#[tokio::test]
async fn test_robots_and_probe_hit_same_sitemap_once() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!("Sitemap: {}/s1.xml\n", uri)),
        )
        .mount(&server)
        .await;
    mount_head(&server, "/s1.xml").await;
    Mock::given(method("GET"))
        .and(path("/s1.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<urlset/>"))
        .expect(1)
        .mount(&server)
        .await;

    let page = Page::parse(&uri, "<html></html>").unwrap();
    let catalog = DiscoveryCatalog::empty().with_sitemap_paths(strings(&["/s1.xml"]));

    let result = FeedSitemapDiscoverer::new(fetcher(), catalog)
        .discover(&page)
        .await
        .unwrap();

    let urls: Vec<&str> = result.sitemaps.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(urls, vec![format!("{}/s1.xml", uri).as_str()]);
}

#[tokio::test]
async fn test_relative_robots_sitemap_matches_probed_path() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Sitemap: /s1.xml\n"))
        .mount(&server)
        .await;
    mount_head(&server, "/s1.xml").await;
    Mock::given(method("GET"))
        .and(path("/s1.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<sitemapindex><sitemap><loc>posts.xml</loc></sitemap></sitemapindex>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = Page::parse(&format!("{}/blog/", uri), "<html></html>").unwrap();
    let catalog = DiscoveryCatalog::empty().with_sitemap_paths(strings(&["/s1.xml"]));

    let result = FeedSitemapDiscoverer::new(fetcher(), catalog)
        .discover(&page)
        .await
        .unwrap();

    assert_eq!(
        result.sitemaps,
        vec![SitemapNode {
            url: format!("{}/s1.xml", uri),
            children: vec![format!("{}/posts.xml", uri)],
            is_index: true,
        }]
    );
}

#[tokio::test]
async fn test_sitemap_urls_are_unique_for_default_catalog() {
    let server = MockServer::start().await;
    let uri = server.uri();

    // Every HEAD succeeds
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "Sitemap: {uri}/sitemap.xml\nSitemap: {uri}/plan-du-site.xml\nSitemap: {uri}/sitemap.xml\n"
        )))
        .mount(&server)
        .await;

    let page = Page::parse(&uri, "<html></html>").unwrap();
    let result = FeedSitemapDiscoverer::new(fetcher(), DiscoveryCatalog::default())
        .discover(&page)
        .await
        .unwrap();

    let unique: HashSet<&str> = result.sitemaps.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(unique.len(), result.sitemaps.len());
    assert_eq!(result.sitemaps.len(), 19);
    assert_eq!(result.sitemaps[0].url, format!("{}/sitemap.xml", uri));
    assert_eq!(result.sitemaps[1].url, format!("{}/plan-du-site.xml", uri));
    assert_eq!(result.rss_feeds.len(), 12);
}

#[tokio::test]
async fn test_feed_discovery_reports_progress() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = messages.clone();

    let page = Page::parse(&uri, "<html></html>").unwrap();
    let catalog = DiscoveryCatalog::empty()
        .with_sitemap_paths(strings(&["/sitemap.xml"]))
        .with_feed_paths(strings(&["/feed", "/rss"]));

    FeedSitemapDiscoverer::new(fetcher(), catalog)
        .with_progress_callback(Arc::new(move |msg: String| {
            sink.lock().unwrap().push(msg);
        }))
        .discover(&page)
        .await
        .unwrap();

    let messages = messages.lock().unwrap();
    assert_eq!(
        *messages,
        vec![
            format!("Reading {}/robots.txt", uri),
            "Probing 1 sitemap paths".to_string(),
            "Probing 2 feed paths".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_feed_discovery_rejects_opaque_origin() {
    let page = Page::parse("data:text/html,<p>hi</p>", "<p>hi</p>").unwrap();
    let result = FeedSitemapDiscoverer::new(fetcher(), DiscoveryCatalog::empty())
        .discover(&page)
        .await;

    assert!(result.is_err());
}

// ============================================================================
// Login Discovery Tests
// ============================================================================

#[tokio::test]
async fn test_login_discovery_combines_page_and_paths() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_head(&server, "/login").await;
    mount_head(&server, "/admin").await;

    let page = Page::parse(
        &format!("{}/", uri),
        r#"<html><body>
            <a href="/login">Sign in</a>
            <form action="/session"><button type="submit">Log in</button></form>
        </body></html>"#,
    )
    .unwrap();

    let catalog = DiscoveryCatalog::default()
        .with_login_paths(strings(&["/login", "/admin", "/signin"]));

    let result = LoginPageDiscoverer::new(fetcher(), catalog)
        .discover(&page)
        .await
        .unwrap();

    let pages: Vec<(&str, &str)> = result
        .login_pages
        .iter()
        .map(|c| (c.url.as_str(), c.source.as_str()))
        .collect();

    assert_eq!(
        pages,
        vec![
            (format!("{}/login", uri).as_str(), "Found in link: \"Sign in\""),
            (
                format!("{}/session", uri).as_str(),
                "Found in form with button: \"Log in\""
            ),
            (format!("{}/admin", uri).as_str(), COMMON_PATH_SOURCE),
        ]
    );
}

#[tokio::test]
async fn test_login_discovery_never_repeats_urls() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let page = Page::parse(
        &uri,
        r#"<a href="/login">Login</a>
           <a href="/login" title="Log in again">Account</a>
           <form action="/login"><input type="submit" value="Sign in"></form>
           <a href="/connexion">Connexion</a>"#,
    )
    .unwrap();

    let result = LoginPageDiscoverer::new(fetcher(), DiscoveryCatalog::default())
        .discover(&page)
        .await
        .unwrap();

    let unique: HashSet<&str> = result.login_pages.iter().map(|c| c.url.as_str()).collect();
    assert_eq!(unique.len(), result.login_pages.len());
    assert_eq!(result.login_pages.len(), 19);

    let login = &result.login_pages[0];
    assert_eq!(login.url, format!("{}/login", uri));
    assert_eq!(login.source, "Found in link: \"Login\"");

    let connexion = result
        .login_pages
        .iter()
        .find(|c| c.url == format!("{}/connexion", uri))
        .unwrap();
    assert_eq!(connexion.source, "Found in link: \"Connexion\"");
}

#[tokio::test]
async fn test_login_discovery_with_nothing_found() {
    let server = MockServer::start().await;

    let page = Page::parse(&server.uri(), "<html><body><a href=\"/about\">About</a></body></html>")
        .unwrap();

    let result = LoginPageDiscoverer::new(fetcher(), DiscoveryCatalog::default())
        .discover(&page)
        .await
        .unwrap();

    assert!(result.login_pages.is_empty());
}

// ============================================================================
// Request Ordering Tests
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Start(FetchMethod, String),
    End(FetchMethod, String),
}

/// In-memory site that records when each request starts and settles.
struct RecordingSite {
    events: Mutex<Vec<Event>>,
    robots: String,
}

impl RecordingSite {
    fn new(robots: &str) -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            robots: robots.to_string(),
        })
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for RecordingSite {
    async fn fetch(&self, url: &str, method: FetchMethod) -> Result<FetchResponse> {
        self.events
            .lock()
            .unwrap()
            .push(Event::Start(method, url.to_string()));
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.events
            .lock()
            .unwrap()
            .push(Event::End(method, url.to_string()));

        let body = match method {
            FetchMethod::Head => String::new(),
            FetchMethod::Get if url.ends_with("/robots.txt") => self.robots.clone(),
            FetchMethod::Get => "<urlset/>".to_string(),
        };
        Ok(FetchResponse::new(200, body))
    }
}

fn positions(events: &[Event], wanted: impl Fn(&Event) -> bool) -> Vec<usize> {
    events
        .iter()
        .enumerate()
        .filter(|(_, e)| wanted(e))
        .map(|(i, _)| i)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_sitemap_checks_settle_before_feed_checks_and_expansion_is_sequential() {
    let site = RecordingSite::new("Sitemap: https://example.com/declared.xml\n");
    let sitemap_paths: Vec<String> = (1..=7).map(|i| format!("/s{}.xml", i)).collect();
    let feed_paths: Vec<String> = (1..=3).map(|i| format!("/f{}", i)).collect();
    let catalog = DiscoveryCatalog::empty()
        .with_sitemap_paths(sitemap_paths)
        .with_feed_paths(feed_paths);

    let page = Page::parse("https://example.com/", "<html></html>").unwrap();
    let result = FeedSitemapDiscoverer::new(site.clone(), catalog)
        .discover(&page)
        .await
        .unwrap();
    assert_eq!(result.sitemaps.len(), 8);
    assert_eq!(result.rss_feeds.len(), 3);

    let events = site.events();
    let is_sitemap_head = |url: &str| url.starts_with("https://example.com/s");
    let is_feed_head = |url: &str| url.starts_with("https://example.com/f");

    let sitemap_check_ends = positions(&events, |e| {
        matches!(e, Event::End(FetchMethod::Head, url) if is_sitemap_head(url.as_str()))
    });
    let feed_check_starts = positions(&events, |e| {
        matches!(e, Event::Start(FetchMethod::Head, url) if is_feed_head(url.as_str()))
    });
    let feed_check_ends = positions(&events, |e| {
        matches!(e, Event::End(FetchMethod::Head, url) if is_feed_head(url.as_str()))
    });
    assert_eq!(sitemap_check_ends.len(), 7);
    assert_eq!(feed_check_starts.len(), 3);
    assert!(sitemap_check_ends.iter().max() < feed_check_starts.iter().min());

    let expansion: Vec<Event> = events
        .iter()
        .filter(|e| match e {
            Event::Start(FetchMethod::Get, url) | Event::End(FetchMethod::Get, url) => {
                !url.ends_with("/robots.txt")
            }
            _ => false,
        })
        .cloned()
        .collect();
    assert_eq!(expansion.len(), 16);
    for pair in expansion.chunks(2) {
        match pair {
            [Event::Start(_, started), Event::End(_, ended)] => assert_eq!(started, ended),
            other => panic!("overlapping sitemap fetches: {:?}", other),
        }
    }

    let first_expansion = positions(&events, |e| {
        matches!(e, Event::Start(FetchMethod::Get, url) if !url.ends_with("/robots.txt"))
    });
    assert!(feed_check_ends.iter().max() < first_expansion.iter().min());
}

#[tokio::test(start_paused = true)]
async fn test_login_paths_checked_in_batches_after_page_scan() {
    let site = RecordingSite::new("");
    let login_paths: Vec<String> = (1..=7).map(|i| format!("/login{}", i)).collect();
    let catalog = DiscoveryCatalog::default().with_login_paths(login_paths);

    let page = Page::parse(
        "https://example.com/",
        r#"<a href="/account/login3">Log in</a>"#,
    )
    .unwrap();
    let result = LoginPageDiscoverer::new(site.clone(), catalog)
        .discover(&page)
        .await
        .unwrap();

    let pattern: String = site
        .events()
        .iter()
        .map(|e| match e {
            Event::Start(FetchMethod::Head, _) => 'S',
            Event::End(FetchMethod::Head, _) => 'E',
            _ => '?',
        })
        .collect();
    assert_eq!(pattern, "SSSSSEEEEESSEE");

    assert_eq!(result.login_pages.len(), 8);
    assert_eq!(result.login_pages[0].url, "https://example.com/account/login3");
    assert_eq!(result.login_pages[0].source, "Found in link: \"Log in\"");
    assert!(
        result.login_pages[1..]
            .iter()
            .all(|c| c.source == COMMON_PATH_SOURCE)
    );
}
