/// Liveness check for load balancers

use actix_web::HttpResponse;

use crate::routes::ApiResponse;

pub async fn health_check() -> HttpResponse {
    tracing::debug!("Health check endpoint called");
    HttpResponse::Ok().json(ApiResponse::success("OK"))
}
