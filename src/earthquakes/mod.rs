//! Earthquake lookup subsystem.
//!
//! # Data Flow
//! ```text
//! search(city_id, date range)
//!     → cities.rs (resolve city, 404 when missing)
//!     → cache.rs (fresh outcome? return it)
//!     → usgs.rs (GeoJSON query, retried with backoff)
//!     → search.rs (closest feature by geodesic distance, geo.rs)
//!     → cache.rs (store outcome)
//!
//! Background submission (tasks.rs):
//!     submit → Pending → Tokio task runs search → Success | Failure
//! ```

pub mod cache;
pub mod cities;
pub mod geo;
pub mod models;
pub mod search;
pub mod service;
pub mod tasks;
pub mod usgs;

pub use cache::ResultCache;
pub use cities::CityStore;
pub use models::{City, CityError, ClosestEarthquake, DateRange, DateRangeError, NewCity, SearchOutcome};
pub use service::{EarthquakeService, SearchError};
pub use tasks::{TaskRegistry, TaskState, TaskStatus};
pub use usgs::{UsgsClient, UsgsError};
