//! Packages a directory tree into a single self-describing, optionally
//! compressed and encrypted vault archive, and back.
//!
//! The engine is organized bottom-up: a binary-to-text codec and a
//! structured-document codec ([`base64`], [`document`]) underlie a
//! compression layer and a cryptographic core ([`compress`], [`crypto`]),
//! which the tree model and filesystem layer ([`tree`], [`fs_walk`]) build
//! on. [`pipeline`] composes all of that into the envelope dispatch used by
//! [`vault::Vault`], the orchestrator that is this crate's public surface.

pub mod base64;
pub mod compress;
pub mod crypto;
pub mod document;
pub mod error;
pub mod fs_walk;
pub mod password;
pub mod pipeline;
pub mod tree;
pub mod vault;

pub use error::VaultError;
pub use password::PasswordPrompt;
pub use pipeline::CloseOptions;
pub use vault::{Vault, VaultState};
