//! Route table and lookup.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Look up routes by name for URL generation
//! - Return the first route whose pattern and predicates match a request
//!
//! # Design Decisions
//! - Immutable once the application is built (shared via Arc)
//! - O(1) name lookup via HashMap, O(n) ordered scan for matching
//! - Re-registering a name replaces the route in place

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{request::Parts, Method};

use crate::http::Request;
use crate::routing::matcher::{AcceptMatcher, AndMatcher, Matcher, MethodMatcher};
use crate::routing::pattern::{MissingPlaceholder, RoutePattern};
use crate::routing::url::{join_elements, Pregenerator, UrlError};
use crate::routing::Matchdict;

/// Route-level options understood by [`Route::new`].
#[derive(Clone, Default)]
pub struct RouteArgs {
    /// Media type the client must accept.
    pub accept: Option<String>,
    /// Request method the route is limited to.
    pub request_method: Option<Method>,
    /// URL generation hook.
    pub pregenerator: Option<Arc<dyn Pregenerator>>,
}

/// A named, compiled route.
pub struct Route {
    name: String,
    pattern: RoutePattern,
    accept: Option<String>,
    request_method: Option<Method>,
    predicates: AndMatcher,
    pregenerator: Option<Arc<dyn Pregenerator>>,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .field("accept", &self.accept)
            .field("request_method", &self.request_method)
            .field("pregenerator", &self.pregenerator.is_some())
            .finish()
    }
}

impl Route {
    pub fn new(name: impl Into<String>, pattern: RoutePattern, args: RouteArgs) -> Self {
        let mut predicates: Vec<Box<dyn Matcher>> = Vec::new();
        if let Some(accept) = &args.accept {
            predicates.push(Box::new(AcceptMatcher::new(accept.clone())));
        }
        if let Some(method) = &args.request_method {
            predicates.push(Box::new(MethodMatcher::new(method.clone())));
        }

        Self {
            name: name.into(),
            pattern,
            accept: args.accept,
            request_method: args.request_method,
            predicates: AndMatcher::new(predicates),
            pregenerator: args.pregenerator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    pub fn request_method(&self) -> Option<&Method> {
        self.request_method.as_ref()
    }

    pub fn pregenerator(&self) -> Option<&Arc<dyn Pregenerator>> {
        self.pregenerator.as_ref()
    }

    /// Match the request path and predicates.
    pub fn matches(&self, req: &Parts) -> Option<Matchdict> {
        let matchdict = self.pattern.match_path(req.uri.path())?;
        self.predicates.matches(req).then_some(matchdict)
    }

    /// Generate a path for this route.
    pub fn generate(
        &self,
        request: &Request,
        elements: Vec<String>,
        kwargs: Matchdict,
    ) -> Result<String, UrlError> {
        let (elements, kwargs) = match &self.pregenerator {
            Some(pregen) => pregen.pregenerate(request, elements, kwargs),
            None => (elements, kwargs),
        };

        let path = self
            .pattern
            .generate(&kwargs)
            .map_err(|MissingPlaceholder(key)| UrlError::MissingArgument {
                route: self.name.clone(),
                key,
            })?;
        Ok(join_elements(path, &elements))
    }
}

/// Ordered collection of named routes.
#[derive(Debug, Default)]
pub struct RoutesMapper {
    routes: Vec<Arc<Route>>,
    by_name: HashMap<String, usize>,
}

impl RoutesMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route, replacing any route with the same name.
    /// Returns the replaced route.
    pub fn connect(&mut self, route: Route) -> Option<Arc<Route>> {
        let route = Arc::new(route);
        match self.by_name.get(route.name()) {
            Some(&index) => Some(std::mem::replace(&mut self.routes[index], route)),
            None => {
                self.by_name.insert(route.name().to_string(), self.routes.len());
                self.routes.push(route);
                None
            }
        }
    }

    pub fn get_route(&self, name: &str) -> Option<&Arc<Route>> {
        self.by_name.get(name).map(|&index| &self.routes[index])
    }

    pub fn has_route(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All routes, in registration order.
    pub fn get_routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterate over routes matching the request, first registered first.
    pub fn iter_matches<'a>(
        &'a self,
        req: &'a Parts,
    ) -> impl Iterator<Item = (&'a Arc<Route>, Matchdict)> + 'a {
        self.routes
            .iter()
            .filter_map(move |route| route.matches(req).map(|dict| (route, dict)))
    }

    /// First route matching the request.
    pub fn match_request(&self, req: &Parts) -> Option<(Arc<Route>, Matchdict)> {
        self.iter_matches(req)
            .next()
            .map(|(route, dict)| (route.clone(), dict))
    }
}
