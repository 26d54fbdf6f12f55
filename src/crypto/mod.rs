//! Cryptographic core (C4): Argon2id key derivation + XChaCha20-Poly1305
//! authenticated encryption.

pub mod cipher;
pub mod kdf;

use rand::{rngs::OsRng, RngCore};

use crate::error::VaultError;
use kdf::SALT_SIZE;

/// Generate a fresh, cryptographically random salt.
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Encrypt `plaintext` under a key derived from `password` and `salt`.
/// Returns `(ciphertext, nonce)`; the salt is the caller's to persist.
pub fn encrypt(
    plaintext: &[u8],
    password: &str,
    salt: &[u8; SALT_SIZE],
) -> Result<(Vec<u8>, [u8; cipher::NONCE_SIZE]), VaultError> {
    let key = kdf::derive_key(
        password,
        salt,
        kdf::ARGON2_M_COST,
        kdf::ARGON2_T_COST,
        kdf::argon2_p_cost(),
    )?;
    cipher::encrypt(plaintext, &key)
}

/// Decrypt `ciphertext` previously produced by [`encrypt`] with the given
/// password, salt, and nonce.
pub fn decrypt(
    ciphertext: &[u8],
    password: &str,
    salt: &[u8; SALT_SIZE],
    nonce: &[u8; cipher::NONCE_SIZE],
) -> Result<zeroize::Zeroizing<Vec<u8>>, VaultError> {
    let key = kdf::derive_key(
        password,
        salt,
        kdf::ARGON2_M_COST,
        kdf::ARGON2_T_COST,
        kdf::argon2_p_cost(),
    )?;
    cipher::decrypt(ciphertext, &key, nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_round_trip() {
        let salt = generate_salt();
        let (ciphertext, nonce) = encrypt(b"vault contents", "hunter2", &salt).unwrap();
        let plaintext = decrypt(&ciphertext, "hunter2", &salt, &nonce).unwrap();
        assert_eq!(&*plaintext, b"vault contents");
    }

    #[test]
    fn wrong_password_fails() {
        let salt = generate_salt();
        let (ciphertext, nonce) = encrypt(b"vault contents", "correct", &salt).unwrap();
        assert!(matches!(
            decrypt(&ciphertext, "wrong", &salt, &nonce),
            Err(VaultError::IntegrityFailure)
        ));
    }
}
