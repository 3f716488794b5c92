//! Error responses.
//!
//! # Design Decisions
//! - View errors carry their own status; everything else is a 500
//! - The error message is the response body (plain text)
//! - URL generation errors on introspection endpoints are client errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::routing::UrlError;
use crate::view::ViewError;

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl IntoResponse for UrlError {
    fn into_response(self) -> Response {
        let status = match self {
            UrlError::NoSuchRoute(_) => StatusCode::NOT_FOUND,
            UrlError::MissingArgument { .. } | UrlError::InvalidBase(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}
