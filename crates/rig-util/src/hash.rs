use sha2::{Digest, Sha256};
use std::path::Path;

/// SHA-256 of a string, as lowercase hex.
pub fn sha256_str(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// SHA-256 of a file's contents, as lowercase hex.
///
/// Descriptors are small, so the whole file is read at once.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(format!("{:x}", hasher.finalize()))
}

/// First `len` characters of a hex digest, for status lines.
pub fn short_digest(digest: &str, len: usize) -> &str {
    match digest.char_indices().nth(len) {
        Some((idx, _)) => &digest[..idx],
        None => digest,
    }
}
