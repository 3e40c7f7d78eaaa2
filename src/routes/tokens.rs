/// Token Routes
///
/// GET  /tokens/login?guid=<subject>
/// POST /tokens/refresh  {"refresh_token": "...", "access_token": "..."}

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::auth::TokenService;
use crate::error::{AppError, ErrorContext};
use crate::logger::RequestId;
use crate::routes::ApiResponse;

/// Login query string
#[derive(Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub guid: String,
}

/// Token refresh request
#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub access_token: String,
}

/// GET /tokens/login
///
/// Issue a new access/refresh pair for `guid`.
///
/// # Errors
/// - 400: `guid` missing or empty
/// - 409: refresh digest collision, retry
/// - 500: Internal server error
pub async fn login(
    req: HttpRequest,
    query: web::Query<LoginQuery>,
    service: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("login").with_request_id(RequestId::of(&req));

    match service.login(&query.guid).await {
        Ok(pair) => Ok(HttpResponse::Ok().json(ApiResponse::success(pair))),
        Err(e) => {
            context.with_subject(query.guid.clone()).log_error(&e);
            Err(e)
        }
    }
}

/// POST /tokens/refresh
///
/// Rotate a pair: the presented refresh token is burned and a new pair issued.
/// The access token may already be expired.
///
/// # Errors
/// - 400: missing field or malformed body
/// - 403: any pairing, ownership or replay failure (always "Invalid credentials")
/// - 500: Internal server error
pub async fn refresh(
    req: HttpRequest,
    body: web::Json<RefreshRequest>,
    service: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("refresh").with_request_id(RequestId::of(&req));

    match service.refresh(&body.access_token, &body.refresh_token).await {
        Ok(pair) => Ok(HttpResponse::Ok().json(ApiResponse::success(pair))),
        Err(e) => {
            context.log_error(&e);
            Err(e)
        }
    }
}
