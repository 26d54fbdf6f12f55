//! Authenticated encryption (part of C4): XChaCha20-Poly1305 with a
//! 24-byte random nonce, empty associated data. Structure grounded on
//! `serdevault::crypto::cipher`'s AEAD wrapper around the derived key; the
//! cipher itself is swapped for the spec's fixed algorithm.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use crate::crypto::kdf::KEY_SIZE;
use crate::error::VaultError;

/// Nonce size in bytes — 24 bytes for XChaCha20's extended nonce.
pub const NONCE_SIZE: usize = 24;

/// Encrypt `plaintext` with XChaCha20-Poly1305 using the provided key.
/// Returns the ciphertext (with the Poly1305 tag appended) and the fresh
/// random nonce used.
pub fn encrypt(
    plaintext: &[u8],
    key: &Zeroizing<[u8; KEY_SIZE]>,
) -> Result<(Vec<u8>, [u8; NONCE_SIZE]), VaultError> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_ref()));
    let nonce = XNonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| VaultError::IntegrityFailure)?;

    Ok((ciphertext, nonce_bytes))
}

/// Decrypt `ciphertext` with XChaCha20-Poly1305, failing with
/// [`VaultError::IntegrityFailure`] on any authentication mismatch — wrong
/// key, wrong nonce, or tampered ciphertext are indistinguishable by design.
pub fn decrypt(
    ciphertext: &[u8],
    key: &Zeroizing<[u8; KEY_SIZE]>,
    nonce_bytes: &[u8; NONCE_SIZE],
) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_ref()));
    let nonce = XNonce::from_slice(nonce_bytes);

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| VaultError::IntegrityFailure)?;

    Ok(Zeroizing::new(plaintext))
}
