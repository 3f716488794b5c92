//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the dispatch handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Serve route table introspection
//! - Bind the server to a listener and shut down gracefully

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Query, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::{App, RouteInfo};
use crate::config::AppConfig;
use crate::http::Request;
use crate::routing::Matchdict;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<App>,
    pub max_body_bytes: usize,
}

/// HTTP server hosting a configured [`App`].
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    pub fn new(config: AppConfig, app: App) -> Self {
        let state = AppState {
            app: Arc::new(app),
            max_body_bytes: config.limits.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &AppConfig, state: AppState) -> Router {
        let mut router = Router::new();
        if config.introspection.enabled {
            let path = config.introspection.path.as_str();
            router = router
                .route(path, get(routes_handler))
                .route(&format!("{}/url", path), get(url_handler));
        }

        router
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Router with all layers, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Buffers the body and hands the request to the application.
///
/// Bodies over the configured limit are a 413; any other failure to read
/// the body is a 400.
async fn dispatch_handler(
    State(state): State<AppState>,
    parts: Parts,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(bytes) => bytes,
        Err(rejection) => {
            tracing::warn!(
                path = %parts.uri.path(),
                limit = state.max_body_bytes,
                status = rejection.status().as_u16(),
                error = %rejection.body_text(),
                "Request body rejected"
            );
            return rejection.into_response();
        }
    };

    state.app.handle(&parts, body)
}

async fn routes_handler(State(state): State<AppState>) -> Json<Vec<RouteInfo>> {
    Json(state.app.describe())
}

/// `GET {path}/url?route=<name>&<key>=<value>...`
async fn url_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(mut params): Query<HashMap<String, String>>,
) -> Response {
    let Some(name) = params.remove("route") else {
        return (StatusCode::BAD_REQUEST, "Missing `route` query parameter").into_response();
    };

    let mut request = Request::blank("/").with_routes(state.app.routes().clone());
    if let Some(host) = headers.get(header::HOST) {
        request = request.with_header(header::HOST, host.clone());
    }

    let kwargs: Matchdict = params.into_iter().collect();
    match request.route_url(&name, kwargs) {
        Ok(url) => Json(serde_json::json!({ "route": name, "url": url })).into_response(),
        Err(err) => err.into_response(),
    }
}
