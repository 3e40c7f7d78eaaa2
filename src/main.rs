use std::net::TcpListener;
use token_rotation::configuration::get_configuration;
use token_rotation::startup::{build_service, build_store, run};
use token_rotation::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load configuration first; it picks the log format.
    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    init_telemetry(configuration.application.environment);
    tracing::info!(
        environment = ?configuration.application.environment,
        "Configuration loaded successfully"
    );

    let store = build_store(&configuration).await.map_err(|e| {
        tracing::error!("Failed to initialise refresh token store: {}", e);
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Store initialisation error")
    })?;
    let service = build_service(&configuration, store);

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, service)?;
    server.await?;

    tracing::info!("Server stopped");
    Ok(())
}
