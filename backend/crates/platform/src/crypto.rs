//! Hashing and Random Code Utilities

use rand::Rng;
use sha2::{Digest, Sha256};

/// Alphabet for share codes: upper-case letters and digits without 0/O/1/I.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 as lower-case hex
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Generate a short human-readable code using the thread CSPRNG
pub fn random_code(len: usize) -> String {
    random_code_with(&mut rand::rng(), len)
}

/// Generate a code from a caller-supplied RNG (seedable in tests)
pub fn random_code_with<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_sha256_known_values() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_random_code_alphabet() {
        let code = random_code(64);
        assert_eq!(code.len(), 64);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        assert!(!code.contains('0') && !code.contains('O'));
    }

    #[test]
    fn test_random_code_seeded_is_stable() {
        let a = random_code_with(&mut StdRng::seed_from_u64(9), 6);
        let b = random_code_with(&mut StdRng::seed_from_u64(9), 6);
        assert_eq!(a, b);
    }
}
