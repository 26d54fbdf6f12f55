use std::path::PathBuf;

use thiserror::Error;

/// The single error type produced by every operation in this crate.
///
/// Every failure mode named in the vault's error taxonomy gets its own
/// variant; none of them are folded into a generic "something went wrong".
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("{0} does not exist")]
    NotFound(PathBuf),

    #[error("{path} is not a valid vault target: {reason}")]
    InvalidTarget { path: PathBuf, reason: String },

    #[error("invalid operation: {0}")]
    WrongState(String),

    #[error("unsupported directory entry at {path}: {reason}")]
    UnsupportedEntry { path: PathBuf, reason: String },

    #[error("invalid archive: {0}")]
    BadArchive(String),

    #[error("invalid base64 data: {0}")]
    BadEncoding(String),

    #[error("compression error: {0}")]
    BadCompression(String),

    #[error("key derivation error: {0}")]
    KdfError(String),

    /// AEAD authentication rejection. Intentionally vague: wrong password,
    /// wrong salt/nonce, and tampered ciphertext are indistinguishable.
    #[error("decryption failed — wrong password or corrupted vault")]
    IntegrityFailure,

    #[error("password entry cancelled")]
    Cancelled,

    #[error("I/O error on {path}: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("{0} already exists")]
    AlreadyExists(PathBuf),
}

impl From<std::io::Error> for VaultError {
    fn from(source: std::io::Error) -> Self {
        VaultError::Io {
            source,
            path: PathBuf::new(),
        }
    }
}

impl VaultError {
    /// Attach path context to an I/O error raised without one in hand.
    pub fn io_at(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        VaultError::Io {
            source,
            path: path.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;
