//! berth CLI - query and select references in a package cache

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use berth::select::SelectError;
use berth::util::diagnostic::emit;
use berth::util::shell::Shell;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color, cli.command.json_output());

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("berth=debug")
    } else if cli.quiet {
        EnvFilter::new("berth=error")
    } else {
        EnvFilter::new("berth=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(cli, &shell) {
        report(&e, &shell);
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    match cli.command {
        Commands::List(args) => commands::list::execute(args, shell),
        Commands::Remove(args) => commands::remove::execute(args, shell),
        Commands::Cache(args) => commands::cache::execute(args, shell),
        Commands::Pkglist(args) => commands::pkglist::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

fn report(e: &anyhow::Error, shell: &Shell) {
    if shell.is_json() {
        shell.error(format!("{:#}", e));
        return;
    }
    match e.downcast_ref::<SelectError>() {
        Some(select) => emit(&select.to_diagnostic(), shell.use_color()),
        None => eprintln!("error: {:#}", e),
    }
}
