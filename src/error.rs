/// Error Handling Module
///
/// One error type per component plus a unified application error:
/// 1. Token codec errors (signature, structure, expiry)
/// 2. Pairing errors (access/refresh correlation)
/// 3. Refresh record store errors
/// 4. Configuration errors
/// 5. `AppError`, the only type that crosses the HTTP boundary
///
/// Credential failures are deliberately collapsed into `AppError::Unauthorized`
/// so callers cannot tell which check rejected them.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

use crate::auth::Claims;
use crate::routes::ApiResponse;

/// ============================================================================
/// 1. COMPONENT ERROR TYPES
/// ============================================================================

/// Token codec errors
#[derive(Debug)]
pub enum TokenError {
    /// Not a signed claim set, bad signature, wrong issuer or missing claims.
    Malformed(String),
    /// Signature verified but `exp` is in the past. The decoded claims ride along.
    Expired(Box<Claims>),
    /// Signing failed while encoding.
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed(msg) => write!(f, "Malformed token: {}", msg),
            TokenError::Expired(claims) => write!(f, "Token expired at {}", claims.exp),
            TokenError::Signing(msg) => write!(f, "Token signing failed: {}", msg),
        }
    }
}

impl StdError for TokenError {}

/// Access/refresh correlation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairError {
    PairMismatch,
    WrongKind,
}

impl fmt::Display for PairError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairError::PairMismatch => write!(f, "Tokens were not issued together"),
            PairError::WrongKind => write!(f, "Token presented in the wrong slot"),
        }
    }
}

impl StdError for PairError {}

/// Refresh record store errors
#[derive(Debug)]
pub enum StoreError {
    /// A record with the same digest already exists.
    Conflict,
    NotFound,
    /// Conditional update lost: the record was already redeemed.
    AlreadyUsed,
    /// The store did not answer within the configured deadline.
    Timeout(&'static str),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict => write!(f, "Refresh record already exists"),
            StoreError::NotFound => write!(f, "Refresh record not found"),
            StoreError::AlreadyUsed => write!(f, "Refresh record already used"),
            StoreError::Timeout(op) => write!(f, "Store call timed out: {}", op),
            StoreError::Backend(msg) => write!(f, "Store error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23505") => {
                StoreError::Conflict
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
    ParseError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "Missing required config: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Config parse error: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Externally visible error classes
#[derive(Debug)]
pub enum AppError {
    /// Caller-correctable input problem.
    InvalidInput(String),
    /// Any credential, pairing, ownership or replay failure.
    Unauthorized,
    /// Digest collision on create; the caller may retry.
    Conflict,
    /// Signing, store I/O or invariant failure. Detail is logged, never rendered.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "{}", msg),
            AppError::Unauthorized => write!(f, "Invalid credentials"),
            AppError::Conflict => write!(f, "Token already exists"),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AppError::Conflict,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => AppError::Internal(format!("token signing: {}", msg)),
            _ => AppError::Unauthorized,
        }
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Maps an error onto the message a client may see and the log level it deserves
pub trait ErrorHandler {
    fn public_message(&self) -> String;
    fn log_error(&self, context: &ErrorContext);
}

impl ErrorHandler for AppError {
    fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Unauthorized => "Invalid credentials".to_string(),
            AppError::Conflict => "Token already exists, retry login".to_string(),
            AppError::Internal(_) => "internal error".to_string(),
        }
    }

    fn log_error(&self, context: &ErrorContext) {
        let subject = context.subject.as_deref().unwrap_or("-");
        match self {
            AppError::InvalidInput(msg) => {
                tracing::warn!(
                    request_id = %context.request_id,
                    operation = %context.operation,
                    error = %msg,
                    "Invalid input"
                );
            }
            AppError::Unauthorized => {
                tracing::warn!(
                    request_id = %context.request_id,
                    operation = %context.operation,
                    subject = %subject,
                    "Credentials rejected"
                );
            }
            AppError::Conflict => {
                tracing::warn!(
                    request_id = %context.request_id,
                    operation = %context.operation,
                    subject = %subject,
                    "Refresh record conflict"
                );
            }
            AppError::Internal(msg) => {
                tracing::error!(
                    request_id = %context.request_id,
                    operation = %context.operation,
                    subject = %subject,
                    error = %msg,
                    "Internal error"
                );
            }
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(self.public_message()))
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Error context for structured logging of a single operation
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub subject: Option<String>,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            subject: None,
            operation: operation.into(),
        }
    }

    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn with_subject(mut self, subject: String) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn log_error(&self, error: &AppError) {
        error.log_error(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let app_err: AppError = StoreError::Conflict.into();
        assert!(matches!(app_err, AppError::Conflict));
    }

    #[test]
    fn test_store_failures_map_to_internal() {
        for err in [
            StoreError::NotFound,
            StoreError::AlreadyUsed,
            StoreError::Timeout("create"),
            StoreError::Backend("boom".to_string()),
        ] {
            let app_err: AppError = err.into();
            assert!(matches!(app_err, AppError::Internal(_)));
        }
    }

    #[test]
    fn test_token_errors_collapse_to_unauthorized() {
        let app_err: AppError = TokenError::Malformed("bad".to_string()).into();
        assert!(matches!(app_err, AppError::Unauthorized));

        let app_err: AppError = TokenError::Signing("key".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidInput("guid is required".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Internal("db down".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_not_public() {
        let err = AppError::Internal("connection refused to 10.0.0.3".to_string());
        assert_eq!(err.public_message(), "internal error");
    }

    #[test]
    fn test_error_context_creation() {
        let ctx = ErrorContext::new("token_refresh");
        assert_eq!(ctx.operation, "token_refresh");
        assert!(ctx.subject.is_none());

        let ctx = ctx.with_subject("user-42".to_string());
        assert_eq!(ctx.subject, Some("user-42".to_string()));
    }
}
