//! Sample views and their route declarations.
//!
//! Served by the `simple-routes` binary and used by the integration tests.

use serde_json::json;

use crate::app::{ConfigurationError, Configurator};
use crate::http::{Context, Request};
use crate::registrar::{simple_route, Declaration, SimpleRouteOptions};
use crate::routing::Matchdict;
use crate::view::{ClassView, Constructor, Kwargs, ViewClass, ViewMethod, ViewResult};
use crate::view_fn;

pub fn my_view(_request: &Request, _kwargs: &Kwargs) -> ViewResult {
    Ok(json!({"foo": "bar"}).into())
}

pub fn decorated_view(_request: &Request, _kwargs: &Kwargs) -> ViewResult {
    Ok(json!({"foo": "bar"}).into())
}

pub fn matchdict_view(_request: &Request, kwargs: &Kwargs) -> ViewResult {
    let name = kwargs.require("name")?;
    let number = kwargs.require("number")?;
    Ok(json!({"foo": name, "bar": number}).into())
}

pub fn url_view(request: &Request, _kwargs: &Kwargs) -> ViewResult {
    let url = request.route_url(
        "matchdict_view",
        Matchdict::from([("name", "name"), ("number", "1")]),
    )?;
    Ok(json!({ "url": url }).into())
}

/// Views constructed from the request.
pub struct MyViewsClass {
    request: Request,
}

impl MyViewsClass {
    fn imperative_view(&self, _kwargs: &Kwargs) -> ViewResult {
        tracing::trace!(path = %self.request.path(), "imperative_view");
        Ok(json!({"foo": "bar"}).into())
    }

    fn matchdict_view(&self, kwargs: &Kwargs) -> ViewResult {
        matchdict_view(&self.request, kwargs)
    }
}

impl ViewClass for MyViewsClass {
    const NAME: &'static str = "MyViewsClass";

    fn constructor() -> Constructor<Self> {
        Constructor::Request(|request: &Request| MyViewsClass {
            request: request.clone(),
        })
    }

    fn method(name: &str) -> Option<ViewMethod<Self>> {
        match name {
            "imperative_view" => Some(Self::imperative_view),
            "matchdict_view" => Some(Self::matchdict_view),
            _ => None,
        }
    }
}

/// Views constructed from the context and the request.
pub struct MyViewsClassWithContext {
    context: Context,
    request: Request,
}

impl MyViewsClassWithContext {
    fn imperative_view(&self, _kwargs: &Kwargs) -> ViewResult {
        tracing::trace!(
            route = ?self.context.route_name(),
            path = %self.request.path(),
            "imperative_view"
        );
        Ok(json!({"foo": "bar"}).into())
    }

    fn matchdict_view(&self, kwargs: &Kwargs) -> ViewResult {
        matchdict_view(&self.request, kwargs)
    }
}

impl ViewClass for MyViewsClassWithContext {
    const NAME: &'static str = "MyViewsClassWithContext";

    fn constructor() -> Constructor<Self> {
        Constructor::ContextRequest(|context: &Context, request: &Request| MyViewsClassWithContext {
            context: context.clone(),
            request: request.clone(),
        })
    }

    fn method(name: &str) -> Option<ViewMethod<Self>> {
        match name {
            "imperative_view" => Some(Self::imperative_view),
            "matchdict_view" => Some(Self::matchdict_view),
            _ => None,
        }
    }
}

/// Needs a third constructor argument, so it cannot serve requests.
pub struct BadClass;

impl BadClass {
    fn imperative_view(&self, _kwargs: &Kwargs) -> ViewResult {
        Ok(json!({"foo": "bar"}).into())
    }
}

impl ViewClass for BadClass {
    const NAME: &'static str = "BadClass";

    fn constructor() -> Constructor<Self> {
        Constructor::Unsupported { params: 3 }
    }

    fn method(name: &str) -> Option<ViewMethod<Self>> {
        match name {
            "imperative_view" => Some(Self::imperative_view),
            _ => None,
        }
    }
}

/// Declarations for the decorated views, in source order.
pub fn routes() -> Vec<Declaration> {
    let json = || SimpleRouteOptions::new().renderer("json");
    vec![
        simple_route("/path/to/decorated/view/func", json()).function(view_fn!(decorated_view)),
        simple_route("/matchdict/{name}/{number}", json()).function(view_fn!(matchdict_view)),
        simple_route("/get_url", json()).function(view_fn!(url_view)),
        simple_route("/path/to/decorated/view/method", json())
            .method::<MyViewsClass>("imperative_view"),
        simple_route("/matchdict/{name}/{number}", json()).method::<MyViewsClass>("matchdict_view"),
        simple_route("/path/to/decorated/view/method", json())
            .method::<MyViewsClassWithContext>("imperative_view"),
        simple_route("/matchdict/{name}/{number}", json())
            .method::<MyViewsClassWithContext>("matchdict_view"),
    ]
}

/// Make every sample view resolvable as `demo.<name>`.
pub fn register_names(config: &mut Configurator) -> Result<(), ConfigurationError> {
    config.register_name("demo.my_view", view_fn!(my_view))?;
    config.register_name("demo.decorated_view", view_fn!(decorated_view))?;
    config.register_name("demo.matchdict_view", view_fn!(matchdict_view))?;
    config.register_name("demo.url_view", view_fn!(url_view))?;
    config.register_name("demo.MyViewsClass", ClassView::of::<MyViewsClass>())?;
    config.register_name(
        "demo.MyViewsClassWithContext",
        ClassView::of::<MyViewsClassWithContext>(),
    )?;
    config.register_name("demo.BadClass", ClassView::of::<BadClass>())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Target;

    #[test]
    fn test_declarations_in_source_order() {
        let paths: Vec<_> = routes().into_iter().map(|d| d.path).collect();
        assert_eq!(paths.len(), 7);
        assert_eq!(paths[0], "/path/to/decorated/view/func");
        assert_eq!(paths[2], "/get_url");
    }

    #[test]
    fn test_register_names() {
        let mut config = Configurator::new();
        register_names(&mut config).unwrap();
        let target = config.maybe_resolve("demo.MyViewsClass").unwrap();
        assert!(target.is_class());
        assert!(matches!(config.maybe_resolve("demo:my_view").unwrap(), Target::Function(_)));
    }
}
