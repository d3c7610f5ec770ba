//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, request span)
//!     → api.rs (JSON endpoints under /api)
//!     → pages.rs (everything else: route table → view)
//!     → error.rs (ApiError → status + JSON body)
//! ```

pub mod api;
pub mod error;
pub mod middleware;
pub mod pages;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer, StartupError};
