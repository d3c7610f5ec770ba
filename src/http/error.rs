//! API error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::earthquakes::tasks::{CITY_NOT_FOUND, UPSTREAM_FAILED};
use crate::earthquakes::{CityError, DateRangeError, SearchError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    City(#[from] CityError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    DateRange(#[from] DateRangeError),
    #[error("missing query parameter '{0}'")]
    MissingParam(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::City(CityError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::City(CityError::DuplicateName(_)) => StatusCode::CONFLICT,
            ApiError::City(_) => StatusCode::BAD_REQUEST,
            ApiError::Search(SearchError::CityNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Search(SearchError::Upstream(_)) => StatusCode::BAD_GATEWAY,
            ApiError::DateRange(_) | ApiError::MissingParam(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message shown to clients. Upstream details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Search(SearchError::CityNotFound(_)) => CITY_NOT_FOUND.to_string(),
            ApiError::Search(SearchError::Upstream(_)) => UPSTREAM_FAILED.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }
        (status, Json(serde_json::json!({ "message": self.public_message() }))).into_response()
    }
}
