//! CLI entry point: argument parsing, password-prompt wiring, and
//! `Error: <message>` stderr formatting. Installs the one `tracing`
//! subscriber in the whole crate — the library itself never does.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use vault_core::password::EnvOrTerminalPrompt;
use vault_core::{CloseOptions, Vault};

use cli::{Args, Commands};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    match args.command {
        None | Some(Commands::Help) => {
            print_help();
            ExitCode::SUCCESS
        }
        Some(Commands::Version) => {
            println!("vault {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Some(Commands::Open { vault, vault_positional, destination }) => run(|| {
            let vault = require_vault(vault, vault_positional)?;
            let mut prompt = EnvOrTerminalPrompt::new();
            let mut handle = Vault::from_path(vault)?;
            handle.open(normalize_destination(destination).as_deref(), &mut prompt)
        }),
        Some(Commands::Close { vault, vault_positional, destination, extension, encrypt, compress }) => run(|| {
            let vault = require_vault(vault, vault_positional)?;
            let mut prompt = EnvOrTerminalPrompt::new();
            let mut handle = Vault::from_path(vault)?;
            let options = CloseOptions { compress, encrypt };
            handle.close(normalize_destination(destination).as_deref(), extension.as_deref(), options, &mut prompt)
        }),
    }
}

fn require_vault(named: Option<std::path::PathBuf>, positional: Option<std::path::PathBuf>) -> Result<std::path::PathBuf, vault_core::VaultError> {
    Commands::resolve_vault(named, positional)
        .ok_or_else(|| vault_core::VaultError::WrongState("--vault (or a positional vault path) is required".to_string()))
}

/// The CLI layer's `""` sentinel for "no destination given" (see
/// `cli::destination`) collapses to `None` here, right before the path
/// reaches the orchestrator — which only ever sees a real destination or none.
fn normalize_destination(destination: Option<std::path::PathBuf>) -> Option<std::path::PathBuf> {
    destination.filter(|d| !d.as_os_str().is_empty())
}

fn run(f: impl FnOnce() -> Result<(), vault_core::VaultError>) -> ExitCode {
    match f() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!(
        "vault — package a directory into a single archive file, or unpack one\n\n\
         USAGE:\n\
         \x20   vault open  [(-v|--vault)] <PATH> [(-d|--destination) <DIR>]\n\
         \x20   vault close [(-v|--vault)] <PATH> [(-d|--destination) <DIR>] [(-e|--extension) <EXT>] [(-E|--encrypt)] [(-C|--compress)]\n\
         \x20   vault help\n\
         \x20   vault version\n\n\
         <PATH> may be given positionally in place of -v/--vault."
    );
}
