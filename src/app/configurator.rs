//! Application configurator.
//!
//! # Responsibilities
//! - Collect routes, views, renderers and dotted names at startup
//! - Apply the active route prefix to registered patterns
//! - Freeze everything into an immutable [`App`]
//!
//! # Design Decisions
//! - Every registration commits immediately; later registrations see it
//! - Views attach to an existing route by name
//! - Prefixes compose left to right through `include`

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;

use crate::app::{App, ConfigurationError, RegisteredView};
use crate::config::RoutesConfig;
use crate::routing::matcher::is_media_type;
use crate::routing::{Route, RouteArgs, RoutePattern, RoutesMapper};
use crate::view::{
    DefaultMapper, JsonRenderer, NameRegistry, Render, StringRenderer, Target, TargetRef,
    ViewMapper, ViewSettings,
};

/// View-level options understood by [`Configurator::add_view`].
#[derive(Clone, Default)]
pub struct ViewArgs {
    /// Route the view is attached to.
    pub route_name: String,
    /// Method called on class views.
    pub attr: Option<String>,
    /// Renderer name.
    pub renderer: Option<String>,
    /// Argument mapper; defaults to [`DefaultMapper`].
    pub mapper: Option<Arc<dyn ViewMapper>>,
    /// Request method the view is limited to.
    pub request_method: Option<Method>,
}

pub struct Configurator {
    settings: RoutesConfig,
    routes: RoutesMapper,
    views: HashMap<String, Vec<RegisteredView>>,
    registry: NameRegistry,
    renderers: HashMap<String, Arc<dyn Render>>,
    route_prefix: Option<String>,
}

impl Configurator {
    pub fn new() -> Self {
        Self::with_settings(RoutesConfig::default())
    }

    pub fn with_settings(settings: RoutesConfig) -> Self {
        let mut renderers: HashMap<String, Arc<dyn Render>> = HashMap::new();
        renderers.insert("json".to_string(), Arc::new(JsonRenderer));
        renderers.insert("string".to_string(), Arc::new(StringRenderer));

        let route_prefix = Some(settings.route_prefix.clone()).filter(|p| !p.is_empty());
        Self {
            settings,
            routes: RoutesMapper::new(),
            views: HashMap::new(),
            registry: NameRegistry::new(),
            renderers,
            route_prefix,
        }
    }

    pub fn settings(&self) -> &RoutesConfig {
        &self.settings
    }

    pub fn routes(&self) -> &RoutesMapper {
        &self.routes
    }

    pub fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    pub fn route_prefix(&self) -> Option<&str> {
        self.route_prefix.as_deref()
    }

    pub fn set_route_prefix(&mut self, prefix: Option<String>) {
        self.route_prefix = prefix.filter(|p| !p.is_empty());
    }

    /// Make `target` resolvable as `name`.
    pub fn register_name(
        &mut self,
        name: &str,
        target: impl Into<Target>,
    ) -> Result<(), ConfigurationError> {
        self.registry.register(name, target)
    }

    /// Resolve dotted names through the registry.
    pub fn maybe_resolve(&self, target: impl Into<TargetRef>) -> Result<Target, ConfigurationError> {
        self.registry.maybe_resolve(target.into())
    }

    pub fn add_renderer(&mut self, name: impl Into<String>, renderer: impl Render + 'static) {
        self.renderers.insert(name.into(), Arc::new(renderer));
    }

    pub fn has_renderer(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    /// Run `f` with `prefix` appended to the active route prefix.
    pub fn include<F>(&mut self, prefix: &str, f: F) -> Result<(), ConfigurationError>
    where
        F: FnOnce(&mut Configurator) -> Result<(), ConfigurationError>,
    {
        let previous = self.route_prefix.clone();
        let composed = match &previous {
            Some(old) => format!(
                "{}/{}",
                old.trim_end_matches('/'),
                prefix.trim_start_matches('/')
            ),
            None => prefix.to_string(),
        };
        self.set_route_prefix(Some(composed));

        let result = f(self);
        self.route_prefix = previous;
        result
    }

    /// Register a named route. The active route prefix is prepended.
    pub fn add_route(
        &mut self,
        name: &str,
        pattern: &str,
        args: RouteArgs,
    ) -> Result<(), ConfigurationError> {
        let pattern = match &self.route_prefix {
            Some(prefix) => format!(
                "{}/{}",
                prefix.trim_end_matches('/'),
                pattern.trim_start_matches('/')
            ),
            None => pattern.to_string(),
        };

        if let Some(accept) = &args.accept {
            if !is_media_type(accept) {
                return Err(ConfigurationError::InvalidAccept(accept.clone()));
            }
        }

        let compiled = RoutePattern::compile(&pattern).map_err(|source| {
            ConfigurationError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            }
        })?;

        let route = Route::new(name, compiled, args);
        tracing::debug!(
            route = %name,
            pattern = %route.pattern().as_str(),
            accept = ?route.accept(),
            "Route added"
        );
        if self.routes.connect(route).is_some() {
            tracing::warn!(route = %name, "Route replaced an existing route with the same name");
        }
        Ok(())
    }

    /// Attach a view to a registered route.
    pub fn add_view(
        &mut self,
        target: impl Into<TargetRef>,
        args: ViewArgs,
    ) -> Result<(), ConfigurationError> {
        let target = self.maybe_resolve(target)?;

        if !self.routes.has_route(&args.route_name) {
            return Err(ConfigurationError::UnknownRoute(args.route_name));
        }

        let renderer = match &args.renderer {
            Some(name) => Some(
                self.renderers
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ConfigurationError::UnknownRenderer(name.clone()))?,
            ),
            None => None,
        };

        if let (Target::Class(class), Some(attr)) = (&target, &args.attr) {
            if !class.has_method(attr) {
                tracing::warn!(
                    class = %class.name(),
                    attr = %attr,
                    "View class has no such method; requests will fail"
                );
            }
        }

        let settings = ViewSettings {
            route_name: Some(args.route_name.clone()),
            attr: args.attr,
            renderer: args.renderer,
        };
        let mapper = args.mapper.unwrap_or_else(|| Arc::new(DefaultMapper));
        let target_name = target.name().to_string();
        let view = mapper.map_view(target, &settings);

        tracing::debug!(
            route = %args.route_name,
            view = %target_name,
            attr = ?settings.attr,
            renderer = ?settings.renderer,
            "View added"
        );

        self.views
            .entry(args.route_name)
            .or_default()
            .push(RegisteredView {
                view,
                target_name,
                attr: settings.attr,
                renderer,
                request_method: args.request_method,
            });
        Ok(())
    }

    /// Freeze the configuration.
    pub fn make_app(self) -> App {
        tracing::info!(routes = self.routes.len(), "Application configured");
        crate::observability::metrics::record_route_count(self.routes.len());
        App::new(self.routes, self.views)
    }
}

impl Default for Configurator {
    fn default() -> Self {
        Self::new()
    }
}
