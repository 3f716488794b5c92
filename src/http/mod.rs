//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, tracing, timeout)
//!     → server.rs dispatch handler (buffer body)
//!     → App::handle (routing + view)
//!     → response.rs (view errors → status + message)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{Context, Request, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
