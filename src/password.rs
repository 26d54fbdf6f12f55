//! Password prompt interface (C9): the core never reads a password itself,
//! it asks an injected `&mut dyn PasswordPrompt` for one.
//!
//! Grounded on `ask_password_with_confirmation` in
//! `examples/original_source/src/Utils.cpp` for the confirm-on-write /
//! single-prompt-on-read split.

use std::env;

use zeroize::Zeroizing;

use crate::error::VaultError;

/// The environment variable checked by [`EnvOrTerminalPrompt`] before
/// falling back to an interactive terminal prompt.
pub const PASSWORD_ENV_VAR: &str = "VAULT_PASSWORD";

/// Supplies passwords to the core at the two points it needs one: closing
/// with `--encrypt` (which must confirm) and opening an encrypted archive
/// (a single prompt).
pub trait PasswordPrompt {
    /// Prompt for a new password, confirming it before returning.
    /// Fails with [`VaultError::Cancelled`] if the confirmation does not match.
    fn prompt_new(&mut self) -> Result<Zeroizing<String>, VaultError>;

    /// Prompt for an existing password (single prompt, no confirmation).
    fn prompt_existing(&mut self) -> Result<Zeroizing<String>, VaultError>;
}

/// Interactive terminal prompt using hidden input (no echo).
#[derive(Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        TerminalPrompt
    }

    fn read_hidden(prompt: &str) -> Result<Zeroizing<String>, VaultError> {
        let password = rpassword::prompt_password(prompt)
            .map_err(|e| VaultError::io_at(e, std::path::PathBuf::from("<tty>")))?;
        Ok(Zeroizing::new(password))
    }
}

impl PasswordPrompt for TerminalPrompt {
    fn prompt_new(&mut self) -> Result<Zeroizing<String>, VaultError> {
        let password = Self::read_hidden("Enter password: ")?;
        let confirm = Self::read_hidden("Confirm password: ")?;
        if *password != *confirm {
            return Err(VaultError::Cancelled);
        }
        Ok(password)
    }

    fn prompt_existing(&mut self) -> Result<Zeroizing<String>, VaultError> {
        Self::read_hidden("Enter password: ")
    }
}

/// Checks [`PASSWORD_ENV_VAR`] first (for scripting/testing); falls back
/// to an interactive [`TerminalPrompt`] when the variable is unset.
///
/// The env-var path skips confirmation on both `prompt_new` and
/// `prompt_existing` — a non-interactive caller has no second party to
/// confirm against.
#[derive(Default)]
pub struct EnvOrTerminalPrompt {
    terminal: TerminalPrompt,
}

impl EnvOrTerminalPrompt {
    pub fn new() -> Self {
        EnvOrTerminalPrompt { terminal: TerminalPrompt::new() }
    }

    fn from_env() -> Option<Zeroizing<String>> {
        env::var(PASSWORD_ENV_VAR).ok().map(Zeroizing::new)
    }
}

impl PasswordPrompt for EnvOrTerminalPrompt {
    fn prompt_new(&mut self) -> Result<Zeroizing<String>, VaultError> {
        match Self::from_env() {
            Some(password) => Ok(password),
            None => self.terminal.prompt_new(),
        }
    }

    fn prompt_existing(&mut self) -> Result<Zeroizing<String>, VaultError> {
        match Self::from_env() {
            Some(password) => Ok(password),
            None => self.terminal.prompt_existing(),
        }
    }
}

/// Wraps a pre-supplied password for non-interactive test use — grounded
/// on `serdevault::vault` tests constructing `VaultFile` directly with a
/// password string rather than prompting.
pub struct FixedPasswordPrompt {
    password: Zeroizing<String>,
}

impl FixedPasswordPrompt {
    pub fn new(password: impl Into<String>) -> Self {
        FixedPasswordPrompt { password: Zeroizing::new(password.into()) }
    }
}

impl PasswordPrompt for FixedPasswordPrompt {
    fn prompt_new(&mut self) -> Result<Zeroizing<String>, VaultError> {
        Ok(self.password.clone())
    }

    fn prompt_existing(&mut self) -> Result<Zeroizing<String>, VaultError> {
        Ok(self.password.clone())
    }
}
