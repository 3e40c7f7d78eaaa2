/// JWT Claims structure
///
/// The payload carried by both tokens of a pair. The pairing marker (`pid`)
/// is what ties an access token to the refresh token issued alongside it.

use serde::{Deserialize, Serialize};

/// Which slot of a pair a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT Claims shared by access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (opaque user identity, e.g. a GUID)
    pub sub: String,
    /// Pairing marker, identical in both tokens of a pair
    pub pid: String,
    /// Token kind
    pub typ: TokenKind,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Build claims issued at `issued_at` and valid for `ttl_seconds`.
    pub fn new(
        subject: &str,
        pair_id: &str,
        kind: TokenKind,
        issued_at: i64,
        ttl_seconds: i64,
        issuer: &str,
    ) -> Self {
        Self {
            sub: subject.to_string(),
            pid: pair_id.to_string(),
            typ: kind,
            exp: issued_at + ttl_seconds,
            iat: issued_at,
            iss: issuer.to_string(),
        }
    }

    /// Check if token has expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}
