//! Transform pipeline and envelope dispatch (C7): composes the document,
//! compression, and encryption layers in the fixed order — compression
//! sits inside encryption — on both close and open.
//!
//! Grounded on `Vault::write_to_file`/`Vault::extract_from_xml`'s envelope
//! nesting (`encrypted` wraps `compressed` wraps `vault`).

use zeroize::Zeroizing;

use crate::base64;
use crate::compress;
use crate::crypto;
use crate::document::{self, Document, Tag};
use crate::error::VaultError;
use crate::password::PasswordPrompt;
use crate::tree::Tree;

/// Flags controlling the outer envelopes applied on close.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloseOptions {
    pub compress: bool,
    pub encrypt: bool,
}

/// Run the close pipeline: `Tree` → archive bytes, wrapped through the
/// requested envelopes. Order is fixed: compression sits inside encryption.
pub fn close(
    tree: &Tree,
    options: CloseOptions,
    prompt: &mut dyn PasswordPrompt,
) -> Result<Vec<u8>, VaultError> {
    let mut doc = tree.to_document();

    if options.compress {
        let plain = document::write(&doc);
        let compressed = compress::compress(plain.as_bytes())?;
        doc = Document::new(
            Tag::Compressed,
            vec![
                ("originalSize".into(), plain.len().to_string()),
                ("data".into(), base64::encode(&compressed)),
            ],
            Vec::new(),
        );
    }

    if options.encrypt {
        let password = prompt.prompt_new()?;
        let plain = document::write(&doc);
        let salt = crypto::generate_salt();
        let (ciphertext, nonce) = crypto::encrypt(plain.as_bytes(), &password, &salt)?;
        doc = Document::new(
            Tag::Encrypted,
            vec![
                ("data".into(), base64::encode(&ciphertext)),
                ("nonce".into(), base64::encode(&nonce)),
                ("salt".into(), base64::encode(&salt)),
            ],
            Vec::new(),
        );
    }

    Ok(document::write(&doc).into_bytes())
}

/// Run the open pipeline: raw file bytes → peeled envelopes → `Tree`.
pub fn open(bytes: &[u8], prompt: &mut dyn PasswordPrompt) -> Result<Tree, VaultError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| VaultError::BadArchive(format!("archive is not valid UTF-8: {e}")))?;
    let mut doc = document::parse(text)?;

    loop {
        match doc.tag {
            Tag::Encrypted => {
                let password = prompt.prompt_existing()?;
                let ciphertext = base64::decode(doc.attr("data"))?;
                let nonce_bytes = base64::decode(doc.attr("nonce"))?;
                let salt_bytes = base64::decode(doc.attr("salt"))?;

                let salt: [u8; crate::crypto::kdf::SALT_SIZE] = salt_bytes
                    .try_into()
                    .map_err(|_| VaultError::BadArchive("salt has the wrong length".into()))?;
                let nonce: [u8; crate::crypto::cipher::NONCE_SIZE] = nonce_bytes
                    .try_into()
                    .map_err(|_| VaultError::BadArchive("nonce has the wrong length".into()))?;

                let plaintext: Zeroizing<Vec<u8>> =
                    crypto::decrypt(&ciphertext, &password, &salt, &nonce)?;
                let plaintext_str = std::str::from_utf8(&plaintext).map_err(|e| {
                    VaultError::BadArchive(format!("decrypted archive is not valid UTF-8: {e}"))
                })?;
                doc = document::parse(plaintext_str)?;
            }
            Tag::Compressed => {
                let compressed = base64::decode(doc.attr("data"))?;
                let original_size: usize = doc.attr("originalSize").parse().map_err(|_| {
                    VaultError::BadArchive("originalSize is not a valid integer".into())
                })?;
                let plain = compress::decompress(&compressed, original_size)?;
                let plain_str = std::str::from_utf8(&plain).map_err(|e| {
                    VaultError::BadArchive(format!("decompressed archive is not valid UTF-8: {e}"))
                })?;
                doc = document::parse(plain_str)?;
            }
            Tag::Vault => return Tree::from_document(&doc),
            other => {
                return Err(VaultError::BadArchive(format!(
                    "unexpected root tag '{}'",
                    other.name()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::FixedPasswordPrompt;
    use crate::tree::TreeNode;

    fn sample_tree() -> Tree {
        Tree::new(
            "v",
            vec![
                TreeNode::File { name: "a.txt".into(), data: base64::encode(b"hello") },
                TreeNode::Directory {
                    name: "sub".into(),
                    children: vec![TreeNode::File {
                        name: "b.bin".into(),
                        data: base64::encode(&[0x00, 0xFF, 0x7F, 0x80]),
                    }],
                },
            ],
        )
    }

    #[test]
    fn plain_round_trip() {
        let tree = sample_tree();
        let mut prompt = FixedPasswordPrompt::new("unused");
        let bytes = close(&tree, CloseOptions::default(), &mut prompt).unwrap();
        assert!(std::str::from_utf8(&bytes).unwrap().starts_with("<vault "));
        let rebuilt = open(&bytes, &mut prompt).unwrap();
        assert_eq!(rebuilt, tree);
    }

    #[test]
    fn compressed_round_trip() {
        let tree = sample_tree();
        let mut prompt = FixedPasswordPrompt::new("unused");
        let options = CloseOptions { compress: true, encrypt: false };
        let bytes = close(&tree, options, &mut prompt).unwrap();
        assert!(std::str::from_utf8(&bytes).unwrap().starts_with("<compressed "));
        let rebuilt = open(&bytes, &mut prompt).unwrap();
        assert_eq!(rebuilt, tree);
    }

    #[test]
    fn encrypted_round_trip() {
        let tree = sample_tree();
        let mut close_prompt = FixedPasswordPrompt::new("hunter2");
        let options = CloseOptions { compress: false, encrypt: true };
        let bytes = close(&tree, options, &mut close_prompt).unwrap();
        assert!(std::str::from_utf8(&bytes).unwrap().starts_with("<encrypted "));

        let mut open_prompt = FixedPasswordPrompt::new("hunter2");
        let rebuilt = open(&bytes, &mut open_prompt).unwrap();
        assert_eq!(rebuilt, tree);
    }

    #[test]
    fn encrypted_and_compressed_round_trip() {
        let tree = sample_tree();
        let mut close_prompt = FixedPasswordPrompt::new("hunter2");
        let options = CloseOptions { compress: true, encrypt: true };
        let bytes = close(&tree, options, &mut close_prompt).unwrap();

        let mut open_prompt = FixedPasswordPrompt::new("hunter2");
        let rebuilt = open(&bytes, &mut open_prompt).unwrap();
        assert_eq!(rebuilt, tree);
    }

    #[test]
    fn wrong_password_fails_integrity() {
        let tree = sample_tree();
        let mut close_prompt = FixedPasswordPrompt::new("correct");
        let options = CloseOptions { compress: false, encrypt: true };
        let bytes = close(&tree, options, &mut close_prompt).unwrap();

        let mut open_prompt = FixedPasswordPrompt::new("wrong");
        assert!(matches!(open(&bytes, &mut open_prompt), Err(VaultError::IntegrityFailure)));
    }

    #[test]
    fn rejects_unknown_root_tag() {
        let mut prompt = FixedPasswordPrompt::new("unused");
        let bytes = b"<directory name=\"x\"></directory>".to_vec();
        assert!(matches!(open(&bytes, &mut prompt), Err(VaultError::BadArchive(_))));
    }
}
