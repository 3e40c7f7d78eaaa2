use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::configuration::{Settings, StoreBackend};
use crate::error::AppError;
use crate::logger::RequestLogger;
use crate::routes::{health_check, login, refresh};
use crate::store::{InMemoryStore, PostgresStore, RefreshRecordStore};

/// Build the refresh record store selected in settings
///
/// The postgres backend connects and runs pending migrations first.
pub async fn build_store(
    settings: &Settings,
) -> Result<Arc<dyn RefreshRecordStore>, Box<dyn std::error::Error>> {
    match settings.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory refresh token store; records are lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let database = settings
                .database
                .as_ref()
                .ok_or("database section is required for the postgres backend")?;

            tracing::info!("Attempting to connect to database");
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(settings.store.timeout())
                .connect(&database.connection_string())
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database connection pool created and migrated");

            Ok(Arc::new(PostgresStore::new(pool)))
        }
    }
}

/// Assemble the token service from settings and a store
pub fn build_service(settings: &Settings, store: Arc<dyn RefreshRecordStore>) -> TokenService {
    TokenService::new(
        &settings.jwt,
        store,
        settings.store.reuse_policy,
        settings.store.timeout(),
    )
}

pub fn run(listener: TcpListener, service: TokenService) -> Result<Server, std::io::Error> {
    let service = web::Data::new(service);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(service.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::InvalidInput(format!("failed to decode request: {}", err)).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::InvalidInput(format!("invalid query string: {}", err)).into()
            }))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/tokens")
                    .route("/login", web::get().to(login))
                    .route("/refresh", web::post().to(refresh)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
