/// JWT Token Encoding and Decoding
///
/// Signs claim sets with the configured HMAC secret and verifies them on the
/// way back in. Expiry is checked by hand after signature verification so an
/// expired token still yields its claims.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::TokenError;

/// Signs and verifies tokens with one shared secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Verify issuer matches configuration
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Sign a claim set into a compact token
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if the signer fails
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and extract its claims
    ///
    /// # Errors
    /// - `TokenError::Malformed` if the token does not parse, the signature or
    ///   issuer does not match, or a required claim is missing
    /// - `TokenError::Expired` carrying the claims if `exp` is in the past
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation error: {}", e);
                TokenError::Malformed(e.to_string())
            })?;

        if claims.is_expired() {
            return Err(TokenError::Expired(Box::new(claims)));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::TokenKind;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    fn claims_with_ttl(ttl: i64) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims::new("user-42", "marker", TokenKind::Access, now, ttl, "test")
    }

    #[test]
    fn test_encode_and_decode_token() {
        let codec = TokenCodec::new(&get_test_config());
        let claims = claims_with_ttl(3600);

        let token = codec.encode(&claims).expect("Failed to encode token");
        let decoded = codec.decode(&token).expect("Failed to decode token");

        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_invalid_token() {
        let codec = TokenCodec::new(&get_test_config());
        let result = codec.decode("invalid.token.here");

        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_tampered_token() {
        let codec = TokenCodec::new(&get_test_config());
        let token = codec.encode(&claims_with_ttl(3600)).unwrap();

        // Tamper with token
        let tampered = format!("{}X", token);
        let result = codec.decode(&tampered);

        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_wrong_secret() {
        let codec = TokenCodec::new(&get_test_config());
        let token = codec.encode(&claims_with_ttl(3600)).unwrap();

        let mut other = get_test_config();
        other.secret = "another-secret-key-at-least-32-characters".to_string();
        let result = TokenCodec::new(&other).decode(&token);

        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_wrong_issuer() {
        let codec = TokenCodec::new(&get_test_config());
        let token = codec.encode(&claims_with_ttl(3600)).unwrap();

        // Change issuer in validation config
        let mut config = get_test_config();
        config.issuer = "wrong-issuer".to_string();
        let result = TokenCodec::new(&config).decode(&token);

        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_expired_token_returns_claims() {
        let codec = TokenCodec::new(&get_test_config());
        let now = chrono::Utc::now().timestamp();
        let claims = Claims::new("user-42", "marker", TokenKind::Access, now - 7200, 3600, "test");
        let token = codec.encode(&claims).unwrap();

        match codec.decode(&token) {
            Err(TokenError::Expired(expired)) => assert_eq!(*expired, claims),
            other => panic!("Expected Expired, got {:?}", other),
        }
    }

    #[test]
    fn test_expired_and_tampered_is_malformed() {
        let codec = TokenCodec::new(&get_test_config());
        let now = chrono::Utc::now().timestamp();
        let claims = Claims::new("user-42", "marker", TokenKind::Access, now - 7200, 3600, "test");
        let token = format!("{}X", codec.encode(&claims).unwrap());

        assert!(matches!(codec.decode(&token), Err(TokenError::Malformed(_))));
    }
}
