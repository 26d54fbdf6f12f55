//! Vault lifecycle orchestrator (C8): `open`/`close` state transitions,
//! invariant checks, and the atomic swap protocol.
//!
//! Grounded directly on `Vault::open`/`Vault::close`/`Vault::write_to_dir`/
//! `Vault::read_from_file` in `examples/original_source/src/Vault.cpp`: the
//! rename-to-temp, try-materialize-or-write, rollback-on-error,
//! remove-temp-on-success sequence is a near 1:1 structural port.
//! `unique_temp_name` (probe `temp0`, `temp1`, … until free) is grounded
//! on `examples/original_source/src/Utils.cpp::get_temp_name`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::VaultError;
use crate::fs_walk;
use crate::password::PasswordPrompt;
use crate::pipeline::{self, CloseOptions};

/// Whether a [`Vault`] currently refers to a directory on disk (opened) or
/// a single archive file (closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    Closed,
    Opened,
}

/// A handle to a vault at a given on-disk path. Owns the path, the derived
/// vault name, and the current state; transitions through `open`/`close`
/// consume and replace that state.
pub struct Vault {
    path: PathBuf,
    name: String,
    state: VaultState,
}

impl Vault {
    /// Build a handle from an on-disk path, which must be either an
    /// existing regular file (closed) or an existing directory (opened).
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Vault, VaultError> {
        let path = path.into();
        if !path.exists() {
            return Err(VaultError::NotFound(path));
        }

        let state = if path.is_dir() {
            VaultState::Opened
        } else if path.is_file() {
            VaultState::Closed
        } else {
            return Err(VaultError::InvalidTarget {
                path,
                reason: "not a regular file or directory".into(),
            });
        };

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Ok(Vault { path, name, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> VaultState {
        self.state
    }

    /// Opened-from-closed transition: read and decode the archive at
    /// `self.path`, then materialize it as a directory.
    pub fn open(
        &mut self,
        destination: Option<&Path>,
        prompt: &mut dyn PasswordPrompt,
    ) -> Result<(), VaultError> {
        if self.state != VaultState::Closed {
            return Err(VaultError::WrongState(
                "cannot open a vault that is already opened".into(),
            ));
        }
        if let Some(d) = destination {
            require_existing_directory(d)?;
        }

        let bytes = fs::read(&self.path).map_err(|e| VaultError::io_at(e, &self.path))?;
        let tree = pipeline::open(&bytes, prompt)?;

        let backup_path = self.path.clone();
        let parent = parent_of(&backup_path);
        let temp = unique_temp_name(&parent);
        fs::rename(&backup_path, &temp).map_err(|e| VaultError::io_at(e, &backup_path))?;

        let dest_parent = destination.map(Path::to_path_buf).unwrap_or_else(|| parent.clone());
        let new_path = dest_parent.join(&self.name);

        if new_path.exists() {
            let _ = fs::rename(&temp, &backup_path);
            return Err(VaultError::AlreadyExists(new_path));
        }

        tracing::info!(from = %backup_path.display(), to = %new_path.display(), "opening vault");

        match fs_walk::materialize(&tree, &new_path) {
            Ok(()) => {
                remove_path(&temp);
                self.path = new_path;
                self.state = VaultState::Opened;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "rolling back failed open");
                remove_path(&new_path);
                let _ = fs::rename(&temp, &backup_path);
                Err(err)
            }
        }
    }

    /// Closed-from-opened transition: walk the directory at `self.path`
    /// into a tree, then write it (through the requested envelopes) as a
    /// single archive file.
    pub fn close(
        &mut self,
        destination: Option<&Path>,
        extension: Option<&str>,
        options: CloseOptions,
        prompt: &mut dyn PasswordPrompt,
    ) -> Result<(), VaultError> {
        if self.state != VaultState::Opened {
            return Err(VaultError::WrongState(
                "cannot close a vault that is already closed".into(),
            ));
        }
        if let Some(d) = destination {
            require_existing_directory(d)?;
            if is_same_or_nested(d, &self.path) {
                return Err(VaultError::InvalidTarget {
                    path: d.to_path_buf(),
                    reason: "destination must not equal or be nested inside the source".into(),
                });
            }
        }

        let tree = fs_walk::walk(&self.path, &self.name)?;

        let backup_path = self.path.clone();
        let parent = parent_of(&backup_path);
        let temp = unique_temp_name(&parent);
        fs::rename(&backup_path, &temp).map_err(|e| VaultError::io_at(e, &backup_path))?;

        let dest_parent = destination.map(Path::to_path_buf).unwrap_or_else(|| parent.clone());
        let file_name = format!("{}{}", self.name, normalize_extension(extension));
        let new_path = dest_parent.join(file_name);

        if new_path.exists() {
            let _ = fs::rename(&temp, &backup_path);
            return Err(VaultError::AlreadyExists(new_path));
        }

        tracing::info!(from = %backup_path.display(), to = %new_path.display(), "closing vault");

        let result = pipeline::close(&tree, options, prompt)
            .and_then(|bytes| atomic_write(&new_path, &bytes));

        match result {
            Ok(()) => {
                remove_path(&temp);
                self.path = new_path;
                self.state = VaultState::Closed;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "rolling back failed close");
                remove_path(&new_path);
                let _ = fs::rename(&temp, &backup_path);
                Err(err)
            }
        }
    }
}

fn parent_of(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
}

fn require_existing_directory(path: &Path) -> Result<(), VaultError> {
    if !path.is_dir() {
        return Err(VaultError::InvalidTarget {
            path: path.to_path_buf(),
            reason: "destination must be an existing directory".into(),
        });
    }
    Ok(())
}

/// Whether `destination` is the same path as `source`, or nested inside it
/// — both cases the orchestrator must refuse before ever renaming `source`.
fn is_same_or_nested(destination: &Path, source: &Path) -> bool {
    match (destination.canonicalize(), source.canonicalize()) {
        (Ok(d), Ok(s)) => d == s || d.starts_with(&s),
        _ => destination == source,
    }
}

/// Probe `temp0`, `temp1`, … in `parent` until an unused name is found.
fn unique_temp_name(parent: &Path) -> PathBuf {
    let mut counter: u64 = 0;
    loop {
        let candidate = parent.join(format!("temp{counter}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Best-effort removal of a path that may be a file or a directory,
/// used for both the rollback path and the post-success temp cleanup.
fn remove_path(path: &Path) {
    if path.is_dir() {
        let _ = fs::remove_dir_all(path);
    } else {
        let _ = fs::remove_file(path);
    }
}

/// Default extension `.vlt`; an explicitly empty `extension` produces a
/// bare stem; an extension not starting with `.` gets one prepended.
fn normalize_extension(extension: Option<&str>) -> String {
    match extension {
        None => ".vlt".to_string(),
        Some("") => String::new(),
        Some(ext) if ext.starts_with('.') => ext.to_string(),
        Some(ext) => format!(".{ext}"),
    }
}

/// Write `data` to `path` atomically: stage in a sibling temp file, flush,
/// sync, then rename into place. Grounded on `serdevault::format::atomic_write`.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), VaultError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| VaultError::io_at(e, parent))?;
    tmp.write_all(data).map_err(|e| VaultError::io_at(e, path))?;
    tmp.flush().map_err(|e| VaultError::io_at(e, path))?;
    tmp.as_file().sync_all().map_err(|e| VaultError::io_at(e, path))?;
    tmp.persist(path).map_err(|e| VaultError::io_at(e.error, path))?;
    Ok(())
}
