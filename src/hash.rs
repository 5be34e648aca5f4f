use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Fast, deterministic, non-cryptographic hash of `source`, encoded URL-safe.
///
/// The byte length is mixed into a second lane so sources that only differ
/// in trailing zero-like input still diverge.
pub fn hash_source(source: &str) -> String {
    let mut primary = FxHasher::default();
    primary.write(source.as_bytes());
    let mut secondary = FxHasher::default();
    secondary.write_usize(source.len());
    secondary.write(source.as_bytes());
    secondary.write_u64(primary.finish());

    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&primary.finish().to_le_bytes());
    bytes[8..].copy_from_slice(&secondary.finish().to_le_bytes());
    URL_SAFE_NO_PAD.encode(bytes)
}
