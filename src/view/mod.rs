//! View targets.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     FunctionView / ClassView / dotted name
//!     → registry.rs (dotted names resolve to live targets)
//!     → mapper.rs (wrap target into a (context, request) callable)
//!
//! Request:
//!     MappedView(context, request)
//!     → function: view(request, kwargs)
//!     → class: T::new(..) then T::method(attr)(instance, kwargs)
//!     → renderer.rs (turn returned data into a response body)
//! ```
//!
//! # Design Decisions
//! - Class constructor shape is declared by the type, not inspected
//! - Class views are constructed fresh for every request
//! - Views are synchronous; they run inside the dispatch handler

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;
use thiserror::Error;

use crate::http::{Context, Request};
use crate::routing::{Matchdict, UrlError};

pub mod mapper;
pub mod registry;
pub mod renderer;

pub use mapper::{DefaultMapper, MappedView, MatchdictMapper, ViewMapper, ViewSettings};
pub use registry::NameRegistry;
pub use renderer::{JsonRenderer, Render, StringRenderer};

/// Method invoked on class views registered without an `attr`.
pub const CALL_ATTR: &str = "call";

/// Keyword arguments forwarded to a view.
pub type Kwargs = Matchdict;

pub type ViewResult = Result<ViewOutput, ViewError>;

/// Errors raised while invoking a view.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Class should accept `context` and `request` args only (`{class}` takes {params})")]
    InvalidConstructor { class: String, params: usize },

    #[error("view class `{class}` has no method `{attr}`")]
    MissingMethod { class: String, attr: String },

    #[error("missing view argument `{0}`")]
    MissingArgument(String),

    #[error("view for route `{0}` returned data but no renderer is configured")]
    NoRenderer(String),

    #[error("rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Url(#[from] UrlError),

    /// An HTTP error response raised by the view itself.
    #[error("{1}")]
    Http(StatusCode, String),
}

impl ViewError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Http(StatusCode::NOT_FOUND, message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Http(status, _) => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Matchdict {
    /// Value of a required view argument.
    pub fn require(&self, key: &str) -> Result<&str, ViewError> {
        self.get(key)
            .ok_or_else(|| ViewError::MissingArgument(key.to_string()))
    }
}

/// What a view produced.
#[derive(Debug)]
pub enum ViewOutput {
    /// Data to be passed through the route's renderer.
    Value(Value),
    /// A finished response, sent as is.
    Response(Response),
}

impl From<Value> for ViewOutput {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Response> for ViewOutput {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

type ViewFn = dyn Fn(&Request, &Kwargs) -> ViewResult + Send + Sync;

/// A named function view.
#[derive(Clone)]
pub struct FunctionView {
    name: String,
    func: Arc<ViewFn>,
}

impl FunctionView {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Request, &Kwargs) -> ViewResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, request: &Request, kwargs: &Kwargs) -> ViewResult {
        (self.func)(request, kwargs)
    }
}

impl std::fmt::Debug for FunctionView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FunctionView").field(&self.name).finish()
    }
}

/// Wrap a function into a [`FunctionView`] named after the function.
///
/// ```ignore
/// let view = view_fn!(my_view);
/// assert_eq!(view.name(), "my_view");
/// ```
#[macro_export]
macro_rules! view_fn {
    ($name:ident) => {
        $crate::view::FunctionView::new(stringify!($name), $name)
    };
    (@path [$($module:ident ::)+] $name:ident) => {
        $crate::view::FunctionView::new(stringify!($name), $($module ::)+ $name)
    };
    (@path [$($module:ident ::)*] $next:ident :: $($rest:tt)+) => {
        $crate::view_fn!(@path [$($module ::)* $next ::] $($rest)+)
    };
    ($first:ident :: $($rest:tt)+) => {
        $crate::view_fn!(@path [$first ::] $($rest)+)
    };
}

/// How a class view is constructed.
pub enum Constructor<T> {
    /// `T(request)`
    Request(fn(&Request) -> T),
    /// `T(context, request)`
    ContextRequest(fn(&Context, &Request) -> T),
    /// A constructor needing other arguments; invoking the view fails.
    Unsupported { params: usize },
}

/// Method callable on a class view instance.
pub type ViewMethod<T> = fn(&T, &Kwargs) -> ViewResult;

/// A type usable as a class-based view.
pub trait ViewClass: Sized + Send + Sync + 'static {
    /// Declared class name, used for route names.
    const NAME: &'static str;

    fn constructor() -> Constructor<Self>;

    /// Look up a view method by name.
    fn method(name: &str) -> Option<ViewMethod<Self>>;
}

/// Constructor shape captured when a class view is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorShape {
    Request,
    ContextRequest,
    Unsupported { params: usize },
}

trait ErasedClass: Send + Sync {
    fn has_method(&self, attr: &str) -> bool;

    fn invoke(&self, context: &Context, request: &Request, attr: &str, kwargs: &Kwargs)
        -> ViewResult;
}

struct ClassAdapter<T: ViewClass> {
    constructor: Constructor<T>,
}

impl<T: ViewClass> ErasedClass for ClassAdapter<T> {
    fn has_method(&self, attr: &str) -> bool {
        T::method(attr).is_some()
    }

    fn invoke(
        &self,
        context: &Context,
        request: &Request,
        attr: &str,
        kwargs: &Kwargs,
    ) -> ViewResult {
        let instance = match &self.constructor {
            Constructor::Request(new) => new(request),
            Constructor::ContextRequest(new) => new(context, request),
            Constructor::Unsupported { params } => {
                return Err(ViewError::InvalidConstructor {
                    class: T::NAME.to_string(),
                    params: *params,
                })
            }
        };

        let method = T::method(attr).ok_or_else(|| ViewError::MissingMethod {
            class: T::NAME.to_string(),
            attr: attr.to_string(),
        })?;
        method(&instance, kwargs)
    }
}

/// A type-erased class view.
#[derive(Clone)]
pub struct ClassView {
    name: &'static str,
    shape: ConstructorShape,
    class: Arc<dyn ErasedClass>,
}

impl ClassView {
    pub fn of<T: ViewClass>() -> Self {
        let constructor = T::constructor();
        let shape = match &constructor {
            Constructor::Request(_) => ConstructorShape::Request,
            Constructor::ContextRequest(_) => ConstructorShape::ContextRequest,
            Constructor::Unsupported { params } => ConstructorShape::Unsupported { params: *params },
        };
        Self {
            name: T::NAME,
            shape,
            class: Arc::new(ClassAdapter { constructor }),
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn shape(&self) -> ConstructorShape {
        self.shape
    }

    pub fn has_method(&self, attr: &str) -> bool {
        self.class.has_method(attr)
    }

    /// Construct a fresh instance and call `attr` on it.
    pub fn invoke(
        &self,
        context: &Context,
        request: &Request,
        attr: &str,
        kwargs: &Kwargs,
    ) -> ViewResult {
        self.class.invoke(context, request, attr, kwargs)
    }
}

impl std::fmt::Debug for ClassView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassView")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish()
    }
}

/// A resolved view target.
#[derive(Debug, Clone)]
pub enum Target {
    Function(FunctionView),
    Class(ClassView),
}

impl Target {
    /// Declared name of the function or class.
    pub fn name(&self) -> &str {
        match self {
            Self::Function(view) => view.name(),
            Self::Class(view) => view.name(),
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Self::Class(_))
    }
}

impl From<FunctionView> for Target {
    fn from(view: FunctionView) -> Self {
        Self::Function(view)
    }
}

impl From<ClassView> for Target {
    fn from(view: ClassView) -> Self {
        Self::Class(view)
    }
}

/// A target as given at registration: live, or a dotted name to resolve.
#[derive(Debug, Clone)]
pub enum TargetRef {
    Live(Target),
    Dotted(String),
}

impl From<Target> for TargetRef {
    fn from(target: Target) -> Self {
        Self::Live(target)
    }
}

impl From<FunctionView> for TargetRef {
    fn from(view: FunctionView) -> Self {
        Self::Live(view.into())
    }
}

impl From<ClassView> for TargetRef {
    fn from(view: ClassView) -> Self {
        Self::Live(view.into())
    }
}

impl From<&str> for TargetRef {
    fn from(name: &str) -> Self {
        Self::Dotted(name.to_string())
    }
}

impl From<String> for TargetRef {
    fn from(name: String) -> Self {
        Self::Dotted(name)
    }
}
