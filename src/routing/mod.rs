//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, headers)
//!     → mapper.rs (ordered route scan)
//!     → pattern.rs (match path, extract matchdict)
//!     → matcher.rs (evaluate accept/method predicates)
//!     → Return: matched Route + Matchdict, or NoMatch
//!
//! URL generation:
//!     route name + elements + kwargs
//!     → url.rs (pregenerator rewrites kwargs)
//!     → pattern.rs (fill placeholders)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at registration, immutable once the app is built
//! - Deterministic: first match in registration order wins
//! - Predicate failure falls through to the next route

pub mod mapper;
pub mod matchdict;
pub mod matcher;
pub mod pattern;
pub mod url;

pub use mapper::{Route, RouteArgs, RoutesMapper};
pub use matchdict::Matchdict;
pub use pattern::{PatternError, RoutePattern};
pub use url::{OptionalSlashPregenerator, Pregenerator, UrlError, OPTIONAL_SLASH};
