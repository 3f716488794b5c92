//! Request and context handed to views.
//!
//! # Responsibilities
//! - Carry the method, URI, headers and buffered body of the request
//! - Expose the matchdict and matched route
//! - Generate URLs for named routes (`route_path`, `route_url`)
//!
//! # Design Decisions
//! - Built once per request after routing; views only borrow it
//! - The route table is shared via Arc so URL generation needs no locking
//! - The application URL comes from the Host header, falling back to localhost

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, request::Parts, HeaderMap, Method, StatusCode, Uri};
use serde::de::DeserializeOwned;

use crate::routing::{Matchdict, Route, RoutesMapper, UrlError};
use crate::view::ViewError;

/// Header carrying the request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A request as seen by a view.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    matchdict: Matchdict,
    matched_route: Option<Arc<Route>>,
    routes: Arc<RoutesMapper>,
}

impl Request {
    pub(crate) fn from_parts(
        parts: &Parts,
        body: Bytes,
        routes: Arc<RoutesMapper>,
        matched_route: Arc<Route>,
        matchdict: Matchdict,
    ) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            body,
            matchdict,
            matched_route: Some(matched_route),
            routes,
        }
    }

    /// A bare GET request for `path` with no routes, useful for calling
    /// views directly.
    pub fn blank(path: &str) -> Self {
        Self {
            method: Method::GET,
            uri: path.parse().unwrap_or_else(|_| Uri::from_static("/")),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            matchdict: Matchdict::new(),
            matched_route: None,
            routes: Arc::new(RoutesMapper::new()),
        }
    }

    pub fn with_matchdict(mut self, matchdict: impl Into<Matchdict>) -> Self {
        self.matchdict = matchdict.into();
        self
    }

    pub fn with_routes(mut self, routes: Arc<RoutesMapper>) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_header(mut self, name: header::HeaderName, value: header::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decode the body as JSON; malformed bodies are a 400.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ViewError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ViewError::Http(StatusCode::BAD_REQUEST, format!("invalid JSON body: {}", e)))
    }

    pub fn matchdict(&self) -> &Matchdict {
        &self.matchdict
    }

    pub fn matched_route(&self) -> Option<&Arc<Route>> {
        self.matched_route.as_ref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
    }

    /// Scheme and host the request was addressed to, without a trailing slash.
    pub fn application_url(&self) -> String {
        let scheme = self.uri.scheme_str().unwrap_or("http");
        let host = self
            .headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| self.uri.authority().map(|a| a.as_str()))
            .unwrap_or("localhost");
        format!("{}://{}", scheme, host)
    }

    /// Path for the named route.
    pub fn route_path(&self, name: &str, kwargs: impl Into<Matchdict>) -> Result<String, UrlError> {
        self.route_path_with_elements(name, &[], kwargs)
    }

    /// Path for the named route with extra path elements appended.
    pub fn route_path_with_elements(
        &self,
        name: &str,
        elements: &[&str],
        kwargs: impl Into<Matchdict>,
    ) -> Result<String, UrlError> {
        let route = self
            .routes
            .get_route(name)
            .ok_or_else(|| UrlError::NoSuchRoute(name.to_string()))?;
        let elements = elements.iter().map(|e| e.to_string()).collect();
        route.generate(self, elements, kwargs.into())
    }

    /// Absolute URL for the named route.
    pub fn route_url(&self, name: &str, kwargs: impl Into<Matchdict>) -> Result<String, UrlError> {
        let path = self.route_path(name, kwargs)?;
        let base = self.application_url();
        url::Url::parse(&base)
            .and_then(|u| u.join(&path))
            .map(|u| u.to_string())
            .map_err(|_| UrlError::InvalidBase(base))
    }
}

/// Resource a view is invoked for.
///
/// For URL-dispatched requests this is the root resource: it knows the
/// matched route and carries a copy of the matchdict.
#[derive(Debug, Clone, Default)]
pub struct Context {
    route_name: Option<String>,
    matchdict: Matchdict,
}

impl Context {
    pub fn for_request(request: &Request) -> Self {
        Self {
            route_name: request.matched_route().map(|r| r.name().to_string()),
            matchdict: request.matchdict().clone(),
        }
    }

    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.matchdict.get(key)
    }
}
