//! Route declarations kept next to their views.
//!
//! A module lists its routes as [`Declaration`] values; the application
//! collects those lists at startup and registers them with
//! [`SimpleRouteExt::scan`](crate::registrar::SimpleRouteExt::scan).
//!
//! ```ignore
//! pub fn routes() -> Vec<Declaration> {
//!     vec![
//!         simple_route("/hello", SimpleRouteOptions::new().renderer("json"))
//!             .function(view_fn!(hello)),
//!         simple_route("/users/{id}", SimpleRouteOptions::new().renderer("json"))
//!             .method::<UserViews>("show"),
//!     ]
//! }
//! ```

use crate::registrar::SimpleRouteOptions;
use crate::view::{ClassView, FunctionView, TargetRef, ViewClass};

/// Where a declaration was attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// A free function or a whole target.
    Module,
    /// A method of a view class.
    Class,
}

/// A route waiting to be registered.
#[derive(Clone)]
pub struct Declaration {
    pub path: String,
    pub target: TargetRef,
    pub options: SimpleRouteOptions,
    pub scope: Scope,
}

/// Path and options of a declaration, before the target is known.
#[derive(Clone)]
pub struct SimpleRoute {
    path: String,
    options: SimpleRouteOptions,
}

/// Start a declaration for `path`.
pub fn simple_route(path: impl Into<String>, options: SimpleRouteOptions) -> SimpleRoute {
    SimpleRoute {
        path: path.into(),
        options,
    }
}

impl SimpleRoute {
    /// Declare a function view.
    pub fn function(self, view: FunctionView) -> Declaration {
        self.target(view)
    }

    /// Declare any target, live or by dotted name.
    pub fn target(self, target: impl Into<TargetRef>) -> Declaration {
        Declaration {
            path: self.path,
            target: target.into(),
            options: self.options,
            scope: Scope::Module,
        }
    }

    /// Declare a method of a view class. Unless an `attr` option was given,
    /// the method name becomes the `attr`.
    pub fn method<T: ViewClass>(self, name: &str) -> Declaration {
        let mut options = self.options;
        if options.attr.is_none() {
            options.attr = Some(name.to_string());
        }
        Declaration {
            path: self.path,
            target: ClassView::of::<T>().into(),
            options,
            scope: Scope::Class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;
    use crate::view::{Constructor, Kwargs, ViewMethod, ViewResult};
    use serde_json::json;

    struct Pages;

    impl Pages {
        fn index(&self, _kwargs: &Kwargs) -> ViewResult {
            Ok(json!("index").into())
        }
    }

    impl ViewClass for Pages {
        const NAME: &'static str = "Pages";

        fn constructor() -> Constructor<Self> {
            Constructor::Request(|_: &Request| Pages)
        }

        fn method(name: &str) -> Option<ViewMethod<Self>> {
            match name {
                "index" => Some(Self::index),
                _ => None,
            }
        }
    }

    #[test]
    fn test_method_declaration_sets_attr() {
        let declaration = simple_route("/pages", SimpleRouteOptions::new()).method::<Pages>("index");
        assert_eq!(declaration.scope, Scope::Class);
        assert_eq!(declaration.options.attr.as_deref(), Some("index"));
        match declaration.target {
            TargetRef::Live(target) => assert_eq!(target.name(), "Pages"),
            TargetRef::Dotted(_) => panic!("expected live target"),
        }
    }

    #[test]
    fn test_explicit_attr_is_kept() {
        let declaration = simple_route("/pages", SimpleRouteOptions::new().attr("other"))
            .method::<Pages>("index");
        assert_eq!(declaration.options.attr.as_deref(), Some("other"));
    }

    #[test]
    fn test_dotted_target_is_module_scope() {
        let declaration = simple_route("/x", SimpleRouteOptions::new()).target("demo.my_view");
        assert_eq!(declaration.scope, Scope::Module);
        assert!(matches!(declaration.target, TargetRef::Dotted(ref n) if n == "demo.my_view"));
    }
}
