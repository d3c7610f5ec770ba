//! quake-finder library.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────── quake-finder ────────────────────────────┐
//!                    │                                                                      │
//!   GET /, /results  │  ┌─────────┐    ┌─────────────┐    ┌──────────────────┐              │
//!   ─────────────────┼─▶│  http   │───▶│   routing   │───▶│      views       │              │
//!                    │  │ server  │    │ PageRouter  │    │  Home / Results  │              │
//!                    │  └────┬────┘    └─────────────┘    └──────────────────┘              │
//!   /api/...         │       │                                                              │
//!   ─────────────────┼───────┘──▶ api handlers ──▶ earthquakes::EarthquakeService           │
//!                    │                               ├─ CityStore                           │
//!                    │                               ├─ ResultCache (TTL)                   │
//!                    │                               ├─ TaskRegistry                        │
//!                    │                               └─ UsgsClient ─────────────────────────┼──▶ USGS
//!                    │                                                                      │
//!                    │  cross-cutting: config, observability, resilience, lifecycle         │
//!                    └──────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod earthquakes;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod views;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::PageRouter;
