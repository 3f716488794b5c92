//! Configured application and request dispatch.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Configurator (add_route / add_view / add_simple_route / scan)
//!     → make_app()
//!     → App (immutable, shared via Arc)
//!
//! Request:
//!     App::handle(parts, body)
//!     → RoutesMapper::match_request (first matching route)
//!     → view lookup by route name + method predicate
//!     → MappedView(context, request)
//!     → renderer → Response
//! ```
//!
//! # Design Decisions
//! - The first matching route decides; a route without a matching view is a 404
//! - View errors never escape: they become error responses and are logged

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::http::{request::Parts, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::http::{Context, Request};
use crate::observability::metrics;
use crate::routing::RoutesMapper;
use crate::view::renderer::render_output;
use crate::view::{MappedView, Render, ViewError};

pub mod configurator;
pub mod error;

pub use configurator::{Configurator, ViewArgs};
pub use error::ConfigurationError;

/// A view attached to a route.
pub(crate) struct RegisteredView {
    pub(crate) view: MappedView,
    pub(crate) target_name: String,
    pub(crate) attr: Option<String>,
    pub(crate) renderer: Option<Arc<dyn Render>>,
    pub(crate) request_method: Option<Method>,
}

impl RegisteredView {
    fn accepts(&self, method: &Method) -> bool {
        match &self.request_method {
            None => true,
            Some(expected) => {
                expected == method || (*expected == Method::GET && *method == Method::HEAD)
            }
        }
    }
}

/// Route table entry as reported by introspection.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouteInfo {
    pub name: String,
    pub pattern: String,
    pub accept: Option<String>,
    pub views: Vec<String>,
}

/// An immutable, configured application.
pub struct App {
    routes: Arc<RoutesMapper>,
    views: HashMap<String, Vec<RegisteredView>>,
}

impl App {
    pub(crate) fn new(routes: RoutesMapper, views: HashMap<String, Vec<RegisteredView>>) -> Self {
        Self {
            routes: Arc::new(routes),
            views,
        }
    }

    pub fn routes(&self) -> &Arc<RoutesMapper> {
        &self.routes
    }

    /// Describe the route table in registration order.
    pub fn describe(&self) -> Vec<RouteInfo> {
        self.routes
            .get_routes()
            .iter()
            .map(|route| RouteInfo {
                name: route.name().to_string(),
                pattern: route.pattern().as_str().to_string(),
                accept: route.accept().map(str::to_string),
                views: self
                    .views
                    .get(route.name())
                    .map(|views| {
                        views
                            .iter()
                            .map(|v| match &v.attr {
                                Some(attr) => format!("{}.{}", v.target_name, attr),
                                None => v.target_name.clone(),
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Dispatch one request.
    pub fn handle(&self, parts: &Parts, body: Bytes) -> Response {
        let start_time = Instant::now();
        let path = parts.uri.path();

        // 1. Match route
        let (route, matchdict) = match self.routes.match_request(parts) {
            Some(found) => found,
            None => {
                tracing::debug!(method = %parts.method, path = %path, "No route matched");
                metrics::record_request(parts.method.as_str(), 404, "none", start_time);
                return (StatusCode::NOT_FOUND, "No matching route found").into_response();
            }
        };

        // 2. Find a view accepting the method
        let view = self
            .views
            .get(route.name())
            .and_then(|views| views.iter().find(|v| v.accepts(&parts.method)));
        let Some(view) = view else {
            tracing::debug!(route = %route.name(), method = %parts.method, "No view for route");
            metrics::record_request(parts.method.as_str(), 404, route.name(), start_time);
            return (StatusCode::NOT_FOUND, "No view found for route").into_response();
        };

        let request = Request::from_parts(parts, body, self.routes.clone(), route.clone(), matchdict);
        let context = Context::for_request(&request);

        tracing::debug!(
            request_id = request.request_id().unwrap_or("unknown"),
            route = %route.name(),
            view = %view.target_name,
            "Dispatching to view"
        );

        // 3. Call and render
        let response = (view.view)(&context, &request).and_then(|output| {
            render_output(output, view.renderer.as_deref(), &request, route.name())
        });

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                log_view_error(&err, route.name(), &request);
                err.into_response()
            }
        };

        metrics::record_request(
            parts.method.as_str(),
            response.status().as_u16(),
            route.name(),
            start_time,
        );
        response
    }
}

fn log_view_error(err: &ViewError, route: &str, request: &Request) {
    let request_id = request.request_id().unwrap_or("unknown");
    if err.status().is_server_error() {
        tracing::error!(request_id = %request_id, route = %route, error = %err, "View failed");
    } else {
        tracing::debug!(request_id = %request_id, route = %route, error = %err, "View returned an HTTP error");
    }
}
