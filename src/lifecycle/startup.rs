//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated `AppConfig` into a frozen [`App`]
//! - Bind the listener once the route table is ready
//!
//! # Design Decisions
//! - Fail fast: any registration error is fatal
//! - Listeners start last (traffic only when ready)

use tokio::net::TcpListener;

use crate::app::{App, ConfigurationError, Configurator};
use crate::config::AppConfig;

/// Build the application from `config` and a registration callback.
pub fn configure<F>(config: &AppConfig, register: F) -> Result<App, ConfigurationError>
where
    F: FnOnce(&mut Configurator) -> Result<(), ConfigurationError>,
{
    let mut configurator = Configurator::with_settings(config.routes.clone());
    register(&mut configurator)?;
    Ok(configurator.make_app())
}

/// Bind the configured listener address.
pub async fn bind(config: &AppConfig) -> Result<TcpListener, std::io::Error> {
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    Ok(listener)
}
