//! Simple route registration for a URL-dispatch web application.
//!
//! One call binds a path, a view and a renderer: the route is named after
//! the view, matches an optional trailing slash, and forwards matched path
//! segments to the view as keyword arguments.
//!
//! ```ignore
//! let mut config = Configurator::new();
//! config.add_simple_route("/users/{id}", view_fn!(show_user), SimpleRouteOptions::new().renderer("json"))?;
//! config.scan(my_module::routes())?;
//! let server = HttpServer::new(AppConfig::default(), config.make_app());
//! ```

// Registration
pub mod app;
pub mod registrar;
pub mod view;

// URL dispatch
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub mod demo;

pub use app::{App, ConfigurationError, Configurator, ViewArgs};
pub use config::AppConfig;
pub use http::{Context, HttpServer, Request};
pub use lifecycle::Shutdown;
pub use registrar::{simple_route, Declaration, SimpleRouteExt, SimpleRouteOptions};
pub use routing::Matchdict;
pub use view::{
    ClassView, Constructor, FunctionView, Kwargs, ViewClass, ViewError, ViewMethod, ViewOutput,
    ViewResult,
};
