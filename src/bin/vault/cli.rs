//! CLI surface (clap derive), grounded on BlitzArch's `src/cli/mod.rs`.
//!
//! `open`'s `--vault` is checked to be an existing regular file, `close`'s
//! an existing directory, via `value_parser` closures — the idiomatic
//! equivalent of `examples/original_source/src/ArgumentsParser.cpp`'s
//! `CLI::ExistingFile`/`CLI::ExistingDirectory` checks. `--vault` also
//! accepts a bare positional argument in its place, mirroring the
//! original's `ArgumentsParser.cpp::add_positional_option()`
//! (`vault open myfile.vlt` needs no `--vault`) — the same shape as
//! BlitzArch's positional `archive`/`inputs` fields.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vault", author, version, about = "Close a directory into a single archive file, or open one back up.", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open a closed vault archive back into a directory.
    Open {
        /// The vault archive file to open, given positionally.
        #[arg(value_name = "VAULT", value_parser = existing_file)]
        vault_positional: Option<PathBuf>,

        /// The vault archive file to open.
        #[arg(short = 'v', long = "vault", value_parser = existing_file)]
        vault: Option<PathBuf>,

        /// Directory to open the vault into. Defaults to the archive's own directory;
        /// an explicitly empty string has the same effect.
        #[arg(short = 'd', long = "destination", value_parser = destination)]
        destination: Option<PathBuf>,
    },

    /// Close a directory into a single vault archive file.
    Close {
        /// The directory to close, given positionally.
        #[arg(value_name = "VAULT", value_parser = existing_directory)]
        vault_positional: Option<PathBuf>,

        /// The directory to close.
        #[arg(short = 'v', long = "vault", value_parser = existing_directory)]
        vault: Option<PathBuf>,

        /// Directory to write the archive into. Defaults to the source's parent directory;
        /// an explicitly empty string has the same effect.
        #[arg(short = 'd', long = "destination", value_parser = destination)]
        destination: Option<PathBuf>,

        /// Archive file extension. Defaults to ".vlt"; an empty string produces a bare stem.
        #[arg(short = 'e', long = "extension")]
        extension: Option<String>,

        /// Encrypt the archive, prompting for (and confirming) a password.
        #[arg(short = 'E', long = "encrypt")]
        encrypt: bool,

        /// Compress the archive before any encryption.
        #[arg(short = 'C', long = "compress")]
        compress: bool,
    },

    /// Print usage information.
    Help,

    /// Print the version string.
    Version,
}

impl Commands {
    /// Resolves `--vault`/`-v` against the positional form, preferring the
    /// named flag when both are somehow given. `None` means neither was
    /// supplied, for the caller to report as a usage error.
    pub fn resolve_vault(named: Option<PathBuf>, positional: Option<PathBuf>) -> Option<PathBuf> {
        named.or(positional)
    }
}

fn existing_file(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if !path.is_file() {
        return Err(format!("{raw} is not an existing regular file"));
    }
    Ok(path)
}

fn existing_directory(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if !path.is_dir() {
        return Err(format!("{raw} is not an existing directory"));
    }
    Ok(path)
}

/// An explicitly empty `--destination ""` is accepted as a sentinel for
/// "same directory as source" (mirrors `vault::normalize_extension`'s
/// empty-string handling for `--extension`); any non-empty value still has
/// to name an existing directory.
fn destination(raw: &str) -> Result<PathBuf, String> {
    if raw.is_empty() {
        return Ok(PathBuf::new());
    }
    existing_directory(raw)
}
