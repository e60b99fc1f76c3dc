use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sha2::{Digest, Sha256};

const DIGEST_DOMAIN: &[u8] = b"hospital-scheduling:password:v1:";

/// One-way transform used to store and compare passwords.
///
/// The output alphabet is URL-safe base64, so it never contains the `|`
/// field separator used by the flat-file records.
pub fn password_digest(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(DIGEST_DOMAIN);
    hasher.update(plaintext.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Compares two digests without short-circuiting on the first mismatch.
pub fn digests_match(expected: &str, candidate: &str) -> bool {
    let (a, b) = (expected.as_bytes(), candidate.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic_and_hides_plaintext() {
        let digest = password_digest("admin123");
        assert_eq!(digest, password_digest("admin123"));
        assert_ne!(digest, "admin123");
        assert!(!digest.contains('|'));
    }

    #[test]
    fn test_different_passwords_differ() {
        assert_ne!(password_digest("admin123"), password_digest("admin124"));
    }

    #[test]
    fn test_digests_match() {
        let digest = password_digest("pw");
        assert!(digests_match(&digest, &password_digest("pw")));
        assert!(!digests_match(&digest, &password_digest("pW")));
        assert!(!digests_match(&digest, ""));
    }
}
