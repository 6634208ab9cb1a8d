use sha2::{Digest, Sha256};

/// SHA-256 hex digest of migration SQL
pub fn compute_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_stable_hex() {
        let a = compute_checksum("CREATE TABLE t (x)");
        assert_eq!(a.len(), 64);
        assert_eq!(a, compute_checksum("CREATE TABLE t (x)"));
        assert_ne!(a, compute_checksum("CREATE TABLE t (y)"));
    }
}
