//! Page routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming page request (path)
//!     → router.rs (route lookup)
//!     → matcher.rs (normalize path, evaluate patterns)
//!     → Return: matched RouteDefinition + params, or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteDefinition[] (table.rs)
//!     → Validate paths, check path/name uniqueness
//!     → Index static paths and names
//!     → Freeze as immutable PageRouter
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - Static paths beat parameterised ones

pub mod matcher;
pub mod router;
pub mod table;

pub use matcher::Params;
pub use router::{
    title_for, PageRouter, RouteDefinition, RouteError, RouteMatch, RouteMeta, RouteSummary,
};
pub use table::{app_router, app_routes, HOME_TITLE};
