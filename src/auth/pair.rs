/// Token Pair Generation and Pairing Checks
///
/// Every pair shares one random pairing marker. A refresh is only honoured
/// when the presented access and refresh tokens carry the same marker and
/// subject.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::Serialize;

use crate::auth::claims::{Claims, TokenKind};
use crate::auth::jwt::TokenCodec;
use crate::configuration::JwtSettings;
use crate::error::{PairError, TokenError};

const PAIR_ID_LENGTH: usize = 32;

/// An access token and the refresh token issued alongside it
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Mints correlated access/refresh pairs
#[derive(Clone)]
pub struct PairGenerator {
    codec: TokenCodec,
    access_ttl: i64,
    refresh_ttl: i64,
    issuer: String,
}

impl PairGenerator {
    pub fn new(codec: TokenCodec, config: &JwtSettings) -> Self {
        Self {
            codec,
            access_ttl: config.access_token_expiry,
            refresh_ttl: config.refresh_token_expiry,
            issuer: config.issuer.clone(),
        }
    }

    /// Generate a new pair for `subject`
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if either token fails to encode
    pub fn generate_pair(&self, subject: &str) -> Result<TokenPair, TokenError> {
        let pair_id = generate_pair_id();
        let now = chrono::Utc::now().timestamp();

        let access = Claims::new(subject, &pair_id, TokenKind::Access, now, self.access_ttl, &self.issuer);
        let refresh = Claims::new(subject, &pair_id, TokenKind::Refresh, now, self.refresh_ttl, &self.issuer);

        Ok(TokenPair {
            access_token: self.codec.encode(&access)?,
            refresh_token: self.codec.encode(&refresh)?,
        })
    }
}

/// Random pairing marker drawn from the thread-local CSPRNG
fn generate_pair_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PAIR_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Confirm two claim sets were issued together
///
/// Expiry is not looked at; claims of an expired access token are fine here.
pub fn ensure_pair(access: &Claims, refresh: &Claims) -> Result<(), PairError> {
    if access.typ != TokenKind::Access || refresh.typ != TokenKind::Refresh {
        return Err(PairError::WrongKind);
    }
    if access.pid != refresh.pid || access.sub != refresh.sub {
        return Err(PairError::PairMismatch);
    }
    Ok(())
}
