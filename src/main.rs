//! Demo application server.
//!
//! ```text
//!     Client Request
//!     ──────────▶ axum (timeout, request id, trace)
//!                 → App::handle
//!                 → RoutesMapper (first matching route)
//!                 → view (function or class method)
//!                 → renderer
//!     ◀────────── Response
//! ```
//!
//! Configuration is read from the file named by `SIMPLE_ROUTES_CONFIG`, or
//! defaults when unset.

use simple_routes::config::loader::load_from_env;
use simple_routes::lifecycle::{signals, startup, Shutdown};
use simple_routes::observability::{logging, metrics};
use simple_routes::registrar::{SimpleRouteExt, SimpleRouteOptions};
use simple_routes::{demo, HttpServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Configuration (before logging so the filter applies)
    let config = load_from_env()?;
    logging::init(&config.observability)?;

    tracing::info!("simple-routes v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        default_accept = %config.routes.default_accept,
        "Configuration loaded"
    );

    // 2. Metrics exporter
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // 3. Routes
    let app = startup::configure(&config, |c| {
        demo::register_names(c)?;
        c.add_simple_route("/path/to/view", "demo.my_view", SimpleRouteOptions::new().renderer("json"))?;
        c.scan(demo::routes())
    })?;

    // 4. Serve until a signal arrives
    let listener = startup::bind(&config).await?;
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    HttpServer::new(config, app).run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
