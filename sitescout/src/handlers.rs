use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitescout_core::catalog::{DiscoveryCatalog, load_wordlist, normalize_paths};
use sitescout_core::export::{ExportDocument, ExportError, default_export_file_name};
use sitescout_core::report::{
    feeds_summary, generate_feeds_report, generate_login_report, login_summary,
};
use sitescout_core::{
    DiscoveryData, DiscoveryProgressCallback, DiscoveryRequest, DiscoveryService,
    FeedSitemapDiscoverer, LoginPageDiscoverer, discovery_channel,
};
use sitescout_scanner::{
    FeedDiscoveryResult, Fetcher, HttpFetcher, LoginDiscoveryResult, Page, ProbeOptions,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Which discoveries a subcommand runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryKind {
    Feeds,
    Login,
    All,
}

impl DiscoveryKind {
    pub fn from_subcommand(name: &str) -> Option<Self> {
        match name {
            "feeds" => Some(Self::Feeds),
            "login" => Some(Self::Login),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn requests(self) -> Vec<DiscoveryRequest> {
        match self {
            Self::Feeds => vec![DiscoveryRequest::DiscoverFeeds],
            Self::Login => vec![DiscoveryRequest::DiscoverLogin],
            Self::All => vec![
                DiscoveryRequest::DiscoverFeeds,
                DiscoveryRequest::DiscoverLogin,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Results gathered from the discovery service for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryOutcome {
    pub feeds: Option<FeedDiscoveryResult>,
    pub logins: Option<LoginDiscoveryResult>,
}

// Helper functions for the discovery handler

/// Parse the page argument, adding `https://` when no web scheme is given
pub fn parse_page_url(input: &str) -> Result<Url, String> {
    let input = input.trim();

    if let Ok(url) = Url::parse(input)
        && matches!(url.scheme(), "http" | "https")
    {
        return Ok(url);
    }

    let with_scheme = format!("https://{}", input);
    match Url::parse(&with_scheme) {
        Ok(url) if url.host_str().is_some() => Ok(url),
        _ => Err(format!("Invalid page URL '{}'", input)),
    }
}

/// Build the catalog, replacing each list for which a wordlist file was given
pub fn build_catalog(
    sitemap_paths: Option<&PathBuf>,
    feed_paths: Option<&PathBuf>,
    login_paths: Option<&PathBuf>,
    login_keywords: Option<&PathBuf>,
) -> Result<DiscoveryCatalog, String> {
    let mut catalog = DiscoveryCatalog::default();

    if let Some(path) = sitemap_paths {
        catalog = catalog.with_sitemap_paths(normalize_paths(load_wordlist(path)?));
    }
    if let Some(path) = feed_paths {
        catalog = catalog.with_feed_paths(normalize_paths(load_wordlist(path)?));
    }
    if let Some(path) = login_paths {
        catalog = catalog.with_login_paths(normalize_paths(load_wordlist(path)?));
    }
    if let Some(path) = login_keywords {
        catalog = catalog.with_login_keywords(load_wordlist(path)?);
    }

    Ok(catalog)
}

/// Fetch the page, or read its markup from a local file when one is given
pub async fn load_page(
    fetcher: &dyn Fetcher,
    location: &Url,
    html_file: Option<&Path>,
) -> Result<Page, String> {
    match html_file {
        Some(path) => {
            let markup = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read HTML file {}: {}", path.display(), e))?;
            Ok(Page::new(location.clone(), markup))
        }
        None => Page::load(fetcher, location)
            .await
            .map_err(|e| format!("Failed to load {}: {}", location, e)),
    }
}

/// Run the requested discoveries through a page-side service and its client
pub async fn run_discovery(
    page: Page,
    fetcher: Arc<dyn Fetcher>,
    catalog: DiscoveryCatalog,
    options: ProbeOptions,
    kind: DiscoveryKind,
    progress_callback: Option<DiscoveryProgressCallback>,
) -> Result<DiscoveryOutcome, String> {
    let mut feeds = FeedSitemapDiscoverer::with_options(fetcher.clone(), catalog.clone(), options);
    let mut login = LoginPageDiscoverer::with_options(fetcher, catalog, options);
    if let Some(callback) = progress_callback {
        feeds = feeds.with_progress_callback(callback.clone());
        login = login.with_progress_callback(callback);
    }

    let service = DiscoveryService::new(page, feeds, login);
    let (client, receiver) = discovery_channel(kind.requests().len());

    let requests = async move {
        let mut outcome = DiscoveryOutcome::default();
        for request in kind.requests() {
            let data = client.request(request).await.into_result()?;
            match data {
                DiscoveryData::Feeds(result) => outcome.feeds = Some(result),
                DiscoveryData::Login(result) => outcome.logins = Some(result),
            }
        }
        Ok::<_, String>(outcome)
    };

    let (_, outcome) = tokio::join!(service.serve(receiver), requests);
    outcome
}

/// Text report, or pretty JSON keyed by `feeds` / `logins`
pub fn render_outcome(outcome: &DiscoveryOutcome, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Text => {
            let mut report = String::new();
            if let Some(ref feeds) = outcome.feeds {
                report.push_str(&generate_feeds_report(feeds));
            }
            if let Some(ref logins) = outcome.logins {
                report.push_str(&generate_login_report(logins));
            }
            Ok(report)
        }
        OutputFormat::Json => {
            let mut map = serde_json::Map::new();
            if let Some(ref feeds) = outcome.feeds {
                map.insert(
                    "feeds".to_string(),
                    serde_json::to_value(feeds).map_err(|e| e.to_string())?,
                );
            }
            if let Some(ref logins) = outcome.logins {
                map.insert(
                    "logins".to_string(),
                    serde_json::to_value(logins).map_err(|e| e.to_string())?,
                );
            }
            serde_json::to_string_pretty(&serde_json::Value::Object(map)).map_err(|e| e.to_string())
        }
    }
}

/// One-line summaries, in request order
pub fn summarize_outcome(outcome: &DiscoveryOutcome) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(ref feeds) = outcome.feeds {
        lines.push(feeds_summary(feeds));
    }
    if let Some(ref logins) = outcome.logins {
        lines.push(login_summary(logins));
    }
    lines
}

/// Where the export goes: `-o` (with `~` expanded) or a timestamped default
pub fn resolve_export_path(output: Option<&String>, export: bool) -> Option<PathBuf> {
    match output {
        Some(path) => Some(PathBuf::from(shellexpand::tilde(path).as_ref())),
        None if export => Some(PathBuf::from(default_export_file_name())),
        None => None,
    }
}

pub fn write_export(
    outcome: &DiscoveryOutcome,
    page_url: &Url,
    path: &Path,
) -> Result<(), ExportError> {
    let document = ExportDocument::new(
        outcome.feeds.clone(),
        outcome.logins.clone(),
        Some(page_url.to_string()),
    )?;
    document.write_to(path)
}

/// Log to stderr; `RUST_LOG` wins over the `-v` count
pub fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn progress_spinner(quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

pub async fn handle_discover(kind: DiscoveryKind, args: &ArgMatches, quiet: bool) {
    if let Err(e) = execute_discover(kind, args, quiet).await {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

async fn execute_discover(kind: DiscoveryKind, args: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let raw_url = args
        .get_one::<String>("URL")
        .ok_or_else(|| anyhow::anyhow!("A page URL is required"))?;
    let page_url = parse_page_url(raw_url).map_err(anyhow::Error::msg)?;
    let html_file = args.get_one::<PathBuf>("html-file");
    let timeout = *args.get_one::<u64>("timeout").unwrap_or(&10);
    let batch_size = *args.get_one::<usize>("batch-size").unwrap_or(&5);
    let format = args
        .get_one::<String>("format")
        .and_then(|f| OutputFormat::from_str(f))
        .unwrap_or(OutputFormat::Text);
    let export_path = resolve_export_path(args.get_one::<String>("output"), args.get_flag("export"));

    let catalog = build_catalog(
        args.get_one::<PathBuf>("sitemap-paths"),
        args.get_one::<PathBuf>("feed-paths"),
        args.get_one::<PathBuf>("login-paths"),
        args.get_one::<PathBuf>("login-keywords"),
    )
    .map_err(anyhow::Error::msg)?;

    let options = ProbeOptions {
        batch_size,
        timeout: Duration::from_secs(timeout),
    };
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::with_timeout(timeout)?);

    let spinner = progress_spinner(quiet);
    if let Some(ref spinner) = spinner {
        spinner.set_message(format!("Loading {}", page_url));
    }

    let page = load_page(fetcher.as_ref(), &page_url, html_file.map(PathBuf::as_path))
        .await
        .map_err(anyhow::Error::msg);
    let page = match page {
        Ok(page) => page,
        Err(e) => {
            if let Some(ref spinner) = spinner {
                spinner.finish_and_clear();
            }
            return Err(e);
        }
    };
    debug!("Loaded {} ({} bytes)", page.location(), page.markup().len());

    let progress_callback = spinner.clone().map(|spinner| {
        Arc::new(move |message: String| spinner.set_message(message)) as DiscoveryProgressCallback
    });

    let outcome = run_discovery(page, fetcher, catalog, options, kind, progress_callback).await;
    if let Some(ref spinner) = spinner {
        spinner.finish_and_clear();
    }
    let outcome = outcome.map_err(anyhow::Error::msg)?;

    if !quiet && format == OutputFormat::Text {
        for line in summarize_outcome(&outcome) {
            println!("{} {}", "✓".green().bold(), line);
        }
        println!();
    }

    print!("{}", render_outcome(&outcome, format).map_err(anyhow::Error::msg)?);
    if format == OutputFormat::Json {
        println!();
    }

    if let Some(path) = export_path {
        write_export(&outcome, &page_url, &path)?;
        if !quiet {
            println!(
                "{} Exported to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
    }

    Ok(())
}
