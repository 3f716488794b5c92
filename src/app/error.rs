//! Configuration-time errors.

use thiserror::Error;

use crate::routing::PatternError;

/// Errors raised while registering routes and views. All of them abort
/// startup.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("cannot resolve dotted name `{0}`")]
    UnresolvedName(String),

    #[error("invalid dotted name `{0}`")]
    InvalidDottedName(String),

    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("no renderer named `{0}`")]
    UnknownRenderer(String),

    #[error("no route named `{0}`")]
    UnknownRoute(String),

    #[error("invalid accept media type `{0}`")]
    InvalidAccept(String),
}
