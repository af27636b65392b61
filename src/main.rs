//! softshelf - Main entry point
//!
//! Thin text front end over the library: it owns the notification receiver
//! and prints whatever the shelf reports. All state lives in the library.

use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

use tracing::{debug, info};

use softshelf::cli::{Cli, Commands};
use softshelf::{
    Notification, PackageAction, Severity, Shelf, ShellRunner, load_catalog, read_catalog,
};

/// Initialize the logger with appropriate settings.
///
/// Logs go to stderr so notification output on stdout stays clean.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    debug!("softshelf starting up");

    let cli = Cli::parse_args();

    match &cli.command {
        Commands::Validate { path } => match read_catalog(path) {
            Ok(catalog) => {
                info!(packages = catalog.len(), "catalog validated");
                println!("✓ Catalog is valid: {} package(s)", catalog.len());
            }
            Err(err) => {
                eprintln!("✗ Catalog validation failed: {:#}", err);
                std::process::exit(1);
            }
        },
        Commands::List => {
            let (shelf, _notifications) = build_shelf(&cli.catalog, cli.workers);
            print_entries(shelf.entries());
            shelf.shutdown();
        }
        Commands::Search { query } => {
            let (shelf, _notifications) = build_shelf(&cli.catalog, cli.workers);
            print_entries(shelf.filter(query));
            shelf.shutdown();
        }
        Commands::Status { name } => {
            let (shelf, _notifications) = build_shelf(&cli.catalog, cli.workers);
            let state = shelf.probe(name)?;
            println!("{}: {}", name, state);
            shelf.shutdown();
        }
        Commands::Install { name } => run_action(&cli, name, PackageAction::Install)?,
        Commands::Remove { name } => run_action(&cli, name, PackageAction::Remove)?,
        Commands::Update { name } => run_action(&cli, name, PackageAction::Update)?,
    }

    Ok(())
}

/// Load the catalog (with fallback), probe it, and wire up the channels.
fn build_shelf(catalog_path: &Path, workers: usize) -> (Shelf, Receiver<Notification>) {
    let catalog = load_catalog(catalog_path);
    let (notify_tx, notify_rx) = mpsc::channel();
    let shelf = Shelf::new(catalog, Arc::new(ShellRunner::new()), notify_tx, workers);
    (shelf, notify_rx)
}

/// Dispatch one action, wait for its completion, and print every
/// notification the shelf emitted. Exits non-zero on a failed action.
fn run_action(
    cli: &Cli,
    name: &str,
    action: PackageAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut shelf, notifications) = build_shelf(&cli.catalog, cli.workers);

    let id = shelf.request(name, action)?;
    let outcome = shelf.wait_for(id)?;

    for note in notifications.try_iter() {
        match note.severity {
            Severity::Info => println!("{}", note.message),
            Severity::Error => eprintln!("{}", note.message),
        }
    }

    if !outcome.success {
        shelf.shutdown();
        std::process::exit(1);
    }

    shelf.shutdown();
    Ok(())
}

fn print_entries<'a>(entries: impl IntoIterator<Item = &'a softshelf::ShelfEntry>) {
    for entry in entries {
        let state = entry.state().install_state().to_string();
        println!(
            "{:<24} {:<14} {}",
            entry.name(),
            state,
            entry.descriptor().description
        );
    }
}
