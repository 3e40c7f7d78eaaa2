use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::configuration::Environment;

/// Install the global tracing subscriber.
///
/// Production logs JSON at `info`; local and test runs log human-readable
/// text at `debug`. `RUST_LOG` overrides the default level. `log` records
/// (request middleware) are bridged into the same subscriber.
pub fn init_telemetry(environment: Environment) {
    let default_level = match environment {
        Environment::Production => "info",
        Environment::Local | Environment::Test => "debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if environment == Environment::Production {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stdout)
                    .json(),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
            .try_init()
    };

    if let Err(e) = result {
        // Tests spin up several apps in one process; only the first wins.
        tracing::debug!("Telemetry already initialised: {}", e);
    }
}
