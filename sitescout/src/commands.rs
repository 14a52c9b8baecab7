use crate::CLAP_STYLING;
use clap::{arg, command};
use std::path::PathBuf;

fn discovery_command(name: &'static str, about: &'static str) -> clap::Command {
    command!(name)
        .about(about)
        .arg(
            arg!(<URL>)
                .required(true)
                .help("The page to start from (https:// is assumed when no scheme is given)"),
        )
        .arg(
            arg!(--"html-file" <PATH>)
                .required(false)
                .help("Read the page markup from a local file instead of fetching URL")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(-t --"timeout" <SECONDS>)
                .required(false)
                .help("Timeout in seconds for each request and probe")
                .value_parser(clap::value_parser!(u64))
                .default_value("10"),
        )
        .arg(
            arg!(-b --"batch-size" <NUM>)
                .required(false)
                .help("How many path probes run at once against the host")
                .value_parser(clap::value_parser!(usize))
                .default_value("5"),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Output format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Export the results as JSON to this file"),
        )
        .arg(
            arg!(-e --"export")
                .required(false)
                .help("Export the results as JSON to feeds-<timestamp>.json")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"sitemap-paths" <PATH>)
                .required(false)
                .help("Wordlist of sitemap paths to probe instead of the built-in list")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"feed-paths" <PATH>)
                .required(false)
                .help("Wordlist of feed paths to probe instead of the built-in list")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"login-paths" <PATH>)
                .required(false)
                .help("Wordlist of login paths to probe instead of the built-in list")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"login-keywords" <PATH>)
                .required(false)
                .help("Wordlist of login keywords to match links and buttons against")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitescout")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitescout")
        .about("Find the sitemaps, feeds and login pages of the site behind a web page")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress progress and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" ... "Increase log verbosity (-v info, -vv debug)")
                .required(false),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(discovery_command(
            "feeds",
            "Discover sitemaps (from robots.txt, page links and common paths) and RSS/Atom feeds",
        ))
        .subcommand(discovery_command(
            "login",
            "Discover login pages from page links, form buttons and common paths",
        ))
        .subcommand(discovery_command(
            "all",
            "Run both feed/sitemap and login page discovery",
        ))
}
