/// Refresh Token Digests
///
/// The store never sees a refresh token's text, only its SHA-256 digest.

use sha2::{Digest, Sha256};
use std::fmt;

/// Fixed-width one-way digest of a refresh token's raw text
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenDigest([u8; 32]);

impl TokenDigest {
    /// Hash a refresh token using SHA-256
    pub fn of(token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        Self(digest)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl TryFrom<&[u8]> for TokenDigest {
    type Error = std::array::TryFromSliceError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(bytes.try_into()?))
    }
}

impl fmt::Debug for TokenDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short prefix is enough to correlate log lines.
        write!(f, "TokenDigest(")?;
        for byte in &self.0[..4] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "…)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_hashing() {
        let token = "header.payload.signature";
        let hash1 = TokenDigest::of(token);
        let hash2 = TokenDigest::of(token);

        // Same token should produce same hash
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.as_bytes().len(), 32);
    }

    #[test]
    fn test_different_tokens_different_hashes() {
        assert_ne!(TokenDigest::of("token-a"), TokenDigest::of("token-b"));
    }

    #[test]
    fn test_known_digest() {
        // sha256("abc")
        let digest = TokenDigest::of("abc");
        assert_eq!(digest.as_bytes()[..4], [0xba, 0x78, 0x16, 0xbf]);
    }

    #[test]
    fn test_from_slice() {
        let digest = TokenDigest::of("abc");
        let restored = TokenDigest::try_from(&digest.as_bytes()[..]).unwrap();
        assert_eq!(restored, digest);
        assert!(TokenDigest::try_from(&[0u8; 31][..]).is_err());
    }
}
