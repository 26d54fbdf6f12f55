//! Password-based key derivation (part of C4), grounded on
//! `serdevault::crypto::kdf` for the `argon2` crate usage and on
//! `examples/original_source/src/EncryptionManager.cpp::derive_key` for the
//! fixed cost parameters and the hardware-thread-gated parallelism.

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use crate::error::VaultError;

/// Salt size in bytes, fixed by the wire format.
pub const SALT_SIZE: usize = 16;

/// Derived key size in bytes — 256 bits for XChaCha20-Poly1305.
pub const KEY_SIZE: usize = 32;

/// Argon2id memory cost in kibibytes (64 MiB).
pub const ARGON2_M_COST: u32 = 65536;
/// Argon2id iteration count.
pub const ARGON2_T_COST: u32 = 2;

/// Parallelism (Argon2 lanes): 4 on hosts with at least 4 hardware threads,
/// else 1. Fixed per host capability so the parameter is deterministic for
/// a given machine, matching `std::thread::hardware_concurrency() >= 4 ? 4 : 1`.
pub fn argon2_p_cost() -> u32 {
    let threads = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    if threads >= 4 {
        4
    } else {
        1
    }
}

/// Derive a 256-bit key from a password and salt using Argon2id.
pub fn derive_key(
    password: &str,
    salt: &[u8; SALT_SIZE],
    m_cost: u32,
    t_cost: u32,
    p_cost: u32,
) -> Result<Zeroizing<[u8; KEY_SIZE]>, VaultError> {
    let params = Params::new(m_cost, t_cost, p_cost, Some(KEY_SIZE))
        .map_err(|e| VaultError::KdfError(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);

    argon2
        .hash_password_into(password.as_bytes(), salt, key.as_mut())
        .map_err(|e| VaultError::KdfError(e.to_string()))?;

    Ok(key)
}
