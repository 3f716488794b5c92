//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use simple_routes::config::AppConfig;
use simple_routes::lifecycle::startup;
use simple_routes::{ConfigurationError, Configurator, HttpServer, Shutdown};

/// Response pieces a test cares about.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Configurator with the demo names registered, as the tests expect.
pub fn make_config() -> Configurator {
    let mut config = Configurator::new();
    simple_routes::demo::register_names(&mut config).unwrap();
    config
}

/// Router serving `config` with default server settings.
pub fn make_app(config: Configurator) -> Router {
    HttpServer::new(AppConfig::default(), config.make_app()).router()
}

/// Router built through the startup path from a full `AppConfig`.
pub fn make_app_with<F>(app_config: AppConfig, register: F) -> Router
where
    F: FnOnce(&mut Configurator) -> Result<(), ConfigurationError>,
{
    let app = startup::configure(&app_config, |c| {
        simple_routes::demo::register_names(c)?;
        register(c)
    })
    .unwrap();
    HttpServer::new(app_config, app).router()
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_with_accept(router: &Router, uri: &str, accept: &str) -> TestResponse {
    let request = Request::get(uri)
        .header(header::ACCEPT, accept)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

pub async fn request(router: &Router, method: Method, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

/// Serve `app_config` on an ephemeral port; trigger the returned
/// `Shutdown` to stop, then await the handle for the server to finish.
pub async fn spawn_server<F>(
    mut app_config: AppConfig,
    register: F,
) -> (SocketAddr, Shutdown, JoinHandle<()>)
where
    F: FnOnce(&mut Configurator) -> Result<(), ConfigurationError>,
{
    app_config.listener.bind_address = "127.0.0.1:0".to_string();
    let app = startup::configure(&app_config, |c| {
        simple_routes::demo::register_names(c)?;
        register(c)
    })
    .unwrap();

    let listener = TcpListener::bind(&app_config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        HttpServer::new(app_config, app)
            .run(listener, receiver)
            .await
            .unwrap();
    });

    (addr, shutdown, handle)
}
