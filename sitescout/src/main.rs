use commands::command_argument_builder;
use sitescout::handlers::{DiscoveryKind, handle_discover, init_tracing};

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_tracing(chosen_command.get_count("verbose"));

    match chosen_command.subcommand() {
        Some((name, primary_command)) => match DiscoveryKind::from_subcommand(name) {
            Some(kind) => handle_discover(kind, primary_command, quiet).await,
            None => unreachable!("clap should ensure we don't get here"),
        },
        None => unreachable!("clap should ensure we don't get here"),
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
