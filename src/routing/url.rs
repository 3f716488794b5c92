//! URL generation hooks.
//!
//! A pregenerator runs before a route's pattern is filled in and may rewrite
//! the extra path elements and the keyword arguments.

use std::sync::Arc;

use thiserror::Error;

use crate::http::Request;
use crate::routing::Matchdict;

/// Placeholder name used for the optional trailing slash.
pub const OPTIONAL_SLASH: &str = "optional_slash";

/// Pattern suffix matching an optional trailing slash.
pub const OPTIONAL_SLASH_PATTERN: &str = "{optional_slash:/?}";

/// Errors raised while generating a URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("no route named `{0}`")]
    NoSuchRoute(String),

    #[error("route `{route}` needs a value for `{key}`")]
    MissingArgument { route: String, key: String },

    #[error("invalid application url `{0}`")]
    InvalidBase(String),
}

/// Hook invoked during URL generation.
pub trait Pregenerator: Send + Sync {
    fn pregenerate(
        &self,
        request: &Request,
        elements: Vec<String>,
        kwargs: Matchdict,
    ) -> (Vec<String>, Matchdict);
}

impl<F> Pregenerator for F
where
    F: Fn(&Request, Vec<String>, Matchdict) -> (Vec<String>, Matchdict) + Send + Sync,
{
    fn pregenerate(
        &self,
        request: &Request,
        elements: Vec<String>,
        kwargs: Matchdict,
    ) -> (Vec<String>, Matchdict) {
        self(request, elements, kwargs)
    }
}

/// Fills in an empty `optional_slash` so generated URLs carry no trailing
/// slash, after running the caller's own pregenerator.
#[derive(Clone, Default)]
pub struct OptionalSlashPregenerator {
    inner: Option<Arc<dyn Pregenerator>>,
}

impl OptionalSlashPregenerator {
    pub fn new(inner: Option<Arc<dyn Pregenerator>>) -> Self {
        Self { inner }
    }
}

impl std::fmt::Debug for OptionalSlashPregenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionalSlashPregenerator")
            .field("wraps_caller", &self.inner.is_some())
            .finish()
    }
}

impl Pregenerator for OptionalSlashPregenerator {
    fn pregenerate(
        &self,
        request: &Request,
        elements: Vec<String>,
        kwargs: Matchdict,
    ) -> (Vec<String>, Matchdict) {
        let (elements, mut kwargs) = match &self.inner {
            Some(inner) => inner.pregenerate(request, elements, kwargs),
            None => (elements, kwargs),
        };
        kwargs.insert_default(OPTIONAL_SLASH, "");
        (elements, kwargs)
    }
}

/// Append extra path elements to a generated path.
pub fn join_elements(mut path: String, elements: &[String]) -> String {
    if elements.is_empty() {
        return path;
    }
    let suffix: Vec<_> = elements
        .iter()
        .map(|e| urlencoding::encode(e).into_owned())
        .collect();
    if !path.ends_with('/') {
        path.push('/');
    }
    path.push_str(&suffix.join("/"));
    path
}
