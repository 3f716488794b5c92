//! Simple route registration.
//!
//! # Data Flow
//! ```text
//! add_simple_route(path, target, options)
//!     → resolve dotted name (NameRegistry)
//!     → naming.rs (derive name, avoid collisions)
//!     → accept from options or renderer table
//!     → Configurator::add_route (pattern + optional slash + pregenerator)
//!     → Configurator::add_view (MatchdictMapper unless a mapper is given)
//!
//! scan(declarations)
//!     → declare.rs declarations, in list order
//!     → add_simple_route for each
//! ```
//!
//! # Design Decisions
//! - One call registers exactly one route and one view
//! - Unset options fall back to the configurator's `RoutesConfig`
//! - A `/` path under an active prefix registers at the prefix itself

use std::sync::Arc;

use axum::http::Method;

use crate::app::{ConfigurationError, Configurator, ViewArgs};
use crate::routing::url::OPTIONAL_SLASH_PATTERN;
use crate::routing::{OptionalSlashPregenerator, Pregenerator, RouteArgs};
use crate::view::renderer::accept_for_renderer;
use crate::view::{MatchdictMapper, TargetRef, ViewMapper};

pub mod declare;
pub mod naming;

pub use declare::{simple_route, Declaration, Scope, SimpleRoute};
pub use naming::{route_name_for, unique_route_name};

/// Options for [`SimpleRouteExt::add_simple_route`].
///
/// `None` means "use the configurator default" for the first three fields.
#[derive(Clone, Default)]
pub struct SimpleRouteOptions {
    pub append_slash: Option<bool>,
    pub append_matchdict: Option<bool>,
    pub default_accept: Option<String>,
    pub renderer: Option<String>,
    pub accept: Option<String>,
    pub attr: Option<String>,
    pub pregenerator: Option<Arc<dyn Pregenerator>>,
    pub mapper: Option<Arc<dyn ViewMapper>>,
    pub request_method: Option<Method>,
}

impl SimpleRouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_slash(mut self, enabled: bool) -> Self {
        self.append_slash = Some(enabled);
        self
    }

    pub fn append_matchdict(mut self, enabled: bool) -> Self {
        self.append_matchdict = Some(enabled);
        self
    }

    pub fn default_accept(mut self, accept: impl Into<String>) -> Self {
        self.default_accept = Some(accept.into());
        self
    }

    pub fn renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn attr(mut self, attr: impl Into<String>) -> Self {
        self.attr = Some(attr.into());
        self
    }

    pub fn pregenerator(mut self, pregenerator: impl Pregenerator + 'static) -> Self {
        self.pregenerator = Some(Arc::new(pregenerator));
        self
    }

    pub fn mapper(mut self, mapper: impl ViewMapper + 'static) -> Self {
        self.mapper = Some(Arc::new(mapper));
        self
    }

    pub fn request_method(mut self, method: Method) -> Self {
        self.request_method = Some(method);
        self
    }
}

/// Registration directives added to [`Configurator`].
pub trait SimpleRouteExt {
    /// Register a route and its view in one call.
    fn add_simple_route(
        &mut self,
        path: &str,
        target: impl Into<TargetRef>,
        options: SimpleRouteOptions,
    ) -> Result<(), ConfigurationError>;

    /// Register every declaration, in order. Stops at the first error.
    fn scan<I>(&mut self, declarations: I) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = Declaration>;
}

impl SimpleRouteExt for Configurator {
    fn add_simple_route(
        &mut self,
        path: &str,
        target: impl Into<TargetRef>,
        options: SimpleRouteOptions,
    ) -> Result<(), ConfigurationError> {
        let target = self.maybe_resolve(target)?;

        // add_view preconditions are checked before the route is committed.
        if let Some(renderer) = &options.renderer {
            if !self.has_renderer(renderer) {
                return Err(ConfigurationError::UnknownRenderer(renderer.clone()));
            }
        }

        let settings = self.settings();
        let append_slash = options.append_slash.unwrap_or(settings.append_slash);
        let append_matchdict = options.append_matchdict.unwrap_or(settings.append_matchdict);
        let default_accept = options
            .default_accept
            .clone()
            .unwrap_or_else(|| settings.default_accept.clone());

        // Explicit accept wins; otherwise avoid matching */* by default.
        let accept = options.accept.clone().unwrap_or_else(|| {
            accept_for_renderer(options.renderer.as_deref(), &default_accept)
        });

        let candidate = route_name_for(&target, options.attr.as_deref());
        let route_name = unique_route_name(&candidate, |name| self.routes().has_route(name));

        // A default route inside a prefixed include lives at the prefix
        // itself rather than at `<prefix>/`.
        let original_prefix = self.route_prefix().map(str::to_string);
        let mut pattern = path.to_string();
        if path == "/" || path.is_empty() {
            if let Some(prefix) = &original_prefix {
                pattern = prefix.clone();
                self.set_route_prefix(None);
            }
        }

        let pregenerator = if append_slash {
            pattern.push_str(OPTIONAL_SLASH_PATTERN);
            let pregen: Arc<dyn Pregenerator> =
                Arc::new(OptionalSlashPregenerator::new(options.pregenerator.clone()));
            Some(pregen)
        } else {
            options.pregenerator.clone()
        };

        let result = self.add_route(
            &route_name,
            &pattern,
            RouteArgs {
                accept: Some(accept.clone()),
                request_method: None,
                pregenerator,
            },
        );
        self.set_route_prefix(original_prefix);
        result?;

        let mapper = match options.mapper {
            Some(mapper) => Some(mapper),
            None if append_matchdict => {
                let mapper: Arc<dyn ViewMapper> = Arc::new(MatchdictMapper::new());
                Some(mapper)
            }
            None => None,
        };

        self.add_view(
            target,
            ViewArgs {
                route_name: route_name.clone(),
                attr: options.attr,
                renderer: options.renderer,
                mapper,
                request_method: options.request_method,
            },
        )?;

        tracing::debug!(
            route = %route_name,
            path = %path,
            accept = %accept,
            append_slash,
            "Simple route registered"
        );
        Ok(())
    }

    fn scan<I>(&mut self, declarations: I) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = Declaration>,
    {
        let mut count = 0usize;
        for declaration in declarations {
            let Declaration {
                path,
                target,
                options,
                scope,
            } = declaration;
            tracing::trace!(path = %path, scope = ?scope, "Registering declaration");
            self.add_simple_route(&path, target, options)?;
            count += 1;
        }
        tracing::debug!(count, "Scan complete");
        Ok(())
    }
}
