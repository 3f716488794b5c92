//! Renderers turn view data into response bodies.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::http::Request;
use crate::view::{ViewError, ViewOutput};

/// Renderer name to the media type a route should accept.
pub const ACCEPT_RENDERER_MAP: [(&str, &str); 2] =
    [("json", "application/json"), ("string", "text/plain")];

/// Accept value for a route using `renderer`, or `default_accept`.
pub fn accept_for_renderer(renderer: Option<&str>, default_accept: &str) -> String {
    renderer
        .and_then(|name| {
            ACCEPT_RENDERER_MAP
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, media)| *media)
        })
        .unwrap_or(default_accept)
        .to_string()
}

/// Serializes view data.
pub trait Render: Send + Sync {
    fn content_type(&self) -> &str;

    fn render(&self, value: &Value, request: &Request) -> Result<Vec<u8>, ViewError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Render for JsonRenderer {
    fn content_type(&self) -> &str {
        "application/json"
    }

    fn render(&self, value: &Value, _request: &Request) -> Result<Vec<u8>, ViewError> {
        serde_json::to_vec(value).map_err(|e| ViewError::Render(e.to_string()))
    }
}

/// Renders strings verbatim and any other value as its JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringRenderer;

impl Render for StringRenderer {
    fn content_type(&self) -> &str {
        "text/plain"
    }

    fn render(&self, value: &Value, _request: &Request) -> Result<Vec<u8>, ViewError> {
        Ok(match value {
            Value::String(s) => s.clone().into_bytes(),
            other => other.to_string().into_bytes(),
        })
    }
}

/// Turn view output into a response.
pub fn render_output(
    output: ViewOutput,
    renderer: Option<&dyn Render>,
    request: &Request,
    route_name: &str,
) -> Result<Response, ViewError> {
    match output {
        ViewOutput::Response(response) => Ok(response),
        ViewOutput::Value(value) => {
            let renderer = renderer.ok_or_else(|| ViewError::NoRenderer(route_name.to_string()))?;
            let body = renderer.render(&value, request)?;
            Ok((
                [(header::CONTENT_TYPE, renderer.content_type().to_string())],
                body,
            )
                .into_response())
        }
    }
}
