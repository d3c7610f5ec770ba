//! JSON API handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::earthquakes::{City, CityError, DateRange, NewCity, SearchError, SearchOutcome, TaskStatus};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::routing::RouteSummary;

/// `start_date` / `end_date` query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl SearchQuery {
    pub fn range(&self) -> Result<DateRange, ApiError> {
        let start = self.start_date.as_deref().ok_or(ApiError::MissingParam("start_date"))?;
        let end = self.end_date.as_deref().ok_or(ApiError::MissingParam("end_date"))?;
        Ok(DateRange::parse(start, end)?)
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteSummary>> {
    Json(state.pages.routes().map(|r| r.summary()).collect())
}

pub async fn list_cities(State(state): State<AppState>) -> Json<Vec<City>> {
    Json(state.service.cities().list())
}

pub async fn create_city(
    State(state): State<AppState>,
    body: Result<Json<NewCity>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let city = state.service.cities().create(json_body(body)?)?;
    tracing::info!(id = city.id, name = %city.name, "City created");
    Ok((StatusCode::CREATED, Json(city)))
}

pub async fn get_city(
    State(state): State<AppState>,
    Path(city_id): Path<u64>,
) -> Result<Json<City>, ApiError> {
    state
        .service
        .cities()
        .get(city_id)
        .map(Json)
        .ok_or_else(|| ApiError::City(CityError::NotFound(city_id)))
}

pub async fn update_city(
    State(state): State<AppState>,
    Path(city_id): Path<u64>,
    body: Result<Json<NewCity>, JsonRejection>,
) -> Result<Json<City>, ApiError> {
    let city = state.service.update_city(city_id, json_body(body)?)?;
    tracing::info!(id = city.id, name = %city.name, "City updated");
    Ok(Json(city))
}

pub async fn delete_city(
    State(state): State<AppState>,
    Path(city_id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let city = state.service.delete_city(city_id)?;
    tracing::info!(id = city.id, name = %city.name, "City deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Run the closest-earthquake search and wait for the outcome.
pub async fn search_earthquakes(
    State(state): State<AppState>,
    Path(city_id): Path<u64>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchOutcome>, ApiError> {
    let range = query.range()?;
    Ok(Json(state.service.search(city_id, range).await?))
}

/// Queue the search in the background and return its task id.
pub async fn submit_search(
    State(state): State<AppState>,
    Path(city_id): Path<u64>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = query.range()?;
    if state.service.cities().get(city_id).is_none() {
        return Err(SearchError::CityNotFound(city_id).into());
    }

    let task_id = state.tasks.submit(state.service.clone(), city_id, range);
    Ok((StatusCode::ACCEPTED, Json(serde_json::json!({ "task_id": task_id }))))
}

pub async fn task_result(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<TaskStatus>, ApiError> {
    state
        .tasks
        .status(task_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("task {} not found", task_id)))
}
