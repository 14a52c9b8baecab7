// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    DiscoveryKind, DiscoveryOutcome, OutputFormat, build_catalog, load_page, parse_page_url,
    render_outcome, resolve_export_path, run_discovery, write_export,
};
