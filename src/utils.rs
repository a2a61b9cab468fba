// src/utils.rs
use sha2::{Digest, Sha256};

/// Computes SHA256 hash of content with normalized line endings.
/// Always normalizes CRLF/CR to LF before hashing to ensure consistent
/// hashes across Windows/Unix platforms.
#[must_use]
pub fn compute_sha256(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Short, prefixed content address used for evidence and rule identifiers.
#[must_use]
pub fn short_id(prefix: &str, key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{prefix}:{}", &digest[..12])
}

/// Normalizes a path to use forward slashes (cross-platform pattern matching).
#[must_use]
pub fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_ignores_line_endings() {
        assert_eq!(compute_sha256("a\r\nb"), compute_sha256("a\nb"));
        assert_ne!(compute_sha256("a\nb"), compute_sha256("a\nc"));
    }

    #[test]
    fn test_short_id_shape() {
        let id = short_id("ev", "src/a.ts:0:0:code");
        assert!(id.starts_with("ev:"));
        assert_eq!(id.len(), 15);
        assert_eq!(id, short_id("ev", "src/a.ts:0:0:code"));
    }
}
