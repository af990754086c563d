//! Shared SHA-256 hex digest utility.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Short, stable key derived from `text`: the first `len` hex characters of
/// its SHA-256 digest.
pub fn short_hash(text: &str, len: usize) -> String {
    let mut hex = sha256_hex(text.as_bytes());
    hex.truncate(len);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_known_hash() {
        let hash = sha256_hex(b"");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn short_hash_is_prefix_of_full_digest() {
        let full = sha256_hex(b"Visit the zoo");
        let short = short_hash("Visit the zoo", 12);
        assert_eq!(short.len(), 12);
        assert!(full.starts_with(&short));
    }
}
