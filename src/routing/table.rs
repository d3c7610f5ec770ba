//! The application's page route table.

use std::sync::Arc;

use crate::routing::router::{PageRouter, RouteDefinition, RouteError, RouteMeta};
use crate::views::{Home, Results};

pub const HOME_TITLE: &str = "USGS Earthquake - Code Challenge";

/// Page routes in declared order.
pub fn app_routes() -> Vec<RouteDefinition> {
    vec![
        RouteDefinition::new("/", Arc::new(Home))
            .named("Home")
            .with_meta(RouteMeta::new().with("title", HOME_TITLE)),
        RouteDefinition::new("/results", Arc::new(Results)),
    ]
}

/// Construct the router for [`app_routes`].
pub fn app_router() -> Result<PageRouter, RouteError> {
    PageRouter::construct(app_routes())
}
