//! Page dispatch through the route table.

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

use crate::earthquakes::tasks::{CITY_NOT_FOUND, UPSTREAM_FAILED};
use crate::earthquakes::{DateRange, SearchError, SearchOutcome};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::routing::title_for;
use crate::views::{self, PageContext};

/// Fallback handler: resolve the path against the page router and render
/// the bound view.
pub async fn page_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let path = uri.path();

    if path == "/api" || path.starts_with("/api/") {
        return ApiError::NotFound(format!("no endpoint at {}", path)).into_response();
    }
    if method != Method::GET && method != Method::HEAD {
        return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET, HEAD")]).into_response();
    }

    let Some(matched) = state.pages.resolve(path) else {
        tracing::debug!(path = %path, "No page route matched");
        let body = views::not_found(&state.site.default_title, path);
        return (StatusCode::NOT_FOUND, body).into_response();
    };

    let route = matched.route;
    let search = if route.component.wants_search() {
        search_from_query(&state, &query).await
    } else {
        None
    };
    let cities = state.service.cities().list();

    let page = PageContext {
        title: title_for(route, &state.site.default_title),
        params: &matched.params,
        query: &query,
        cities: &cities,
        search: search.as_ref(),
    };
    route.component.render(&page).into_response()
}

/// Run the search named by `city_id`, `start_date` and `end_date`.
/// Returns `None` when the query names no search at all.
async fn search_from_query(
    state: &AppState,
    query: &HashMap<String, String>,
) -> Option<Result<SearchOutcome, String>> {
    let city_id = query.get("city_id");
    let start = query.get("start_date");
    let end = query.get("end_date");
    if city_id.is_none() && start.is_none() && end.is_none() {
        return None;
    }

    let (Some(city_id), Some(start), Some(end)) = (city_id, start, end) else {
        return Some(Err("A city, a start date and an end date are required.".to_string()));
    };
    let Ok(city_id) = city_id.parse::<u64>() else {
        return Some(Err(format!("Invalid city id '{}'.", city_id)));
    };
    let range = match DateRange::parse(start, end) {
        Ok(range) => range,
        Err(e) => return Some(Err(e.to_string())),
    };

    Some(state.service.search(city_id, range).await.map_err(|e| match e {
        SearchError::CityNotFound(_) => CITY_NOT_FOUND.to_string(),
        SearchError::Upstream(_) => UPSTREAM_FAILED.to_string(),
    }))
}
