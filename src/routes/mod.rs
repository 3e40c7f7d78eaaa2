/// HTTP Routes
///
/// Handlers for the token endpoints and the health check. Every body uses the
/// `ApiResponse` envelope.

mod health_check;
mod response;
mod tokens;

pub use health_check::health_check;
pub use response::{ApiResponse, Status};
pub use tokens::{login, refresh};
