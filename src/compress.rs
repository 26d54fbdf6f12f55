//! Compression layer (C3): stateless, self-delimiting zlib-family
//! compression of a byte buffer, grounded on
//! `examples/original_source/src/CompressionManager.cpp`'s `compress`/
//! `uncompress` pair (zlib, with an explicit original-size check on
//! decompression).

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::VaultError;

/// Compress `data`. Total: the empty buffer compresses (to a small nonempty
/// zlib stream) and round-trips.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, VaultError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompress `data`, failing with [`VaultError::BadCompression`] if the
/// stream is corrupt or the decompressed length does not equal
/// `original_size` — guarding against both truncation and a mis-recorded
/// size.
pub fn decompress(data: &[u8], original_size: usize) -> Result<Vec<u8>, VaultError> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::with_capacity(original_size);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| VaultError::BadCompression(e.to_string()))?;
    if out.len() != original_size {
        return Err(VaultError::BadCompression(format!(
            "decompressed size {} does not match recorded original size {}",
            out.len(),
            original_size
        )));
    }
    Ok(out)
}
