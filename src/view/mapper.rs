//! View argument mappers.
//!
//! A mapper wraps a view target into a uniform `(context, request)` callable
//! once, at registration time. The wrapped callable decides how the target
//! is called on each request.

use std::sync::Arc;

use crate::http::{Context, Request};
use crate::routing::OPTIONAL_SLASH;
use crate::view::{Kwargs, Target, ViewResult, CALL_ATTR};

/// A view wrapped for dispatch.
pub type MappedView = Arc<dyn Fn(&Context, &Request) -> ViewResult + Send + Sync>;

/// View registration settings visible to mappers.
#[derive(Debug, Clone, Default)]
pub struct ViewSettings {
    pub route_name: Option<String>,
    pub attr: Option<String>,
    pub renderer: Option<String>,
}

impl ViewSettings {
    /// Method called on class views.
    pub fn attr_or_call(&self) -> &str {
        self.attr.as_deref().unwrap_or(CALL_ATTR)
    }
}

/// Turns a target into a dispatchable view.
pub trait ViewMapper: Send + Sync {
    fn map_view(&self, target: Target, settings: &ViewSettings) -> MappedView;
}

/// Forwards the request matchdict to the view as keyword arguments.
///
/// Reserved keys (`optional_slash`) are removed first.
#[derive(Debug, Clone)]
pub struct MatchdictMapper {
    blacklist: Vec<String>,
}

impl MatchdictMapper {
    pub fn new() -> Self {
        Self {
            blacklist: vec![OPTIONAL_SLASH.to_string()],
        }
    }

    /// Matchdict copy with reserved keys removed.
    pub fn kwargs(&self, request: &Request) -> Kwargs {
        let mut kwargs = request.matchdict().clone();
        for key in &self.blacklist {
            kwargs.remove(key);
        }
        kwargs
    }
}

impl Default for MatchdictMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewMapper for MatchdictMapper {
    fn map_view(&self, target: Target, settings: &ViewSettings) -> MappedView {
        let mapper = self.clone();
        let attr = settings.attr_or_call().to_string();
        Arc::new(move |context: &Context, request: &Request| {
            let kwargs = mapper.kwargs(request);
            call_target(&target, &attr, context, request, &kwargs)
        })
    }
}

/// Calls views with the request only; the matchdict stays on the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMapper;

impl ViewMapper for DefaultMapper {
    fn map_view(&self, target: Target, settings: &ViewSettings) -> MappedView {
        let attr = settings.attr_or_call().to_string();
        Arc::new(move |context: &Context, request: &Request| {
            call_target(&target, &attr, context, request, &Kwargs::new())
        })
    }
}

fn call_target(
    target: &Target,
    attr: &str,
    context: &Context,
    request: &Request,
    kwargs: &Kwargs,
) -> ViewResult {
    match target {
        Target::Function(view) => view.call(request, kwargs),
        Target::Class(view) => view.invoke(context, request, attr, kwargs),
    }
}
