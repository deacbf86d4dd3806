use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use std::fmt;
use weather_core::WeatherError;

/// Which route produced the error; the snapshot route reports upstream
/// failures the way the flattened backend did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Passthrough,
    Snapshot,
    Geocode,
}

#[derive(Debug)]
pub struct ApiError {
    route: Route,
    err: WeatherError,
}

impl ApiError {
    pub fn new(route: Route, err: WeatherError) -> Self {
        Self { route, err }
    }

    fn message(&self) -> &'static str {
        match (&self.err, self.route) {
            (WeatherError::MissingQuery, Route::Geocode) => "Query or coordinates required",
            (WeatherError::MissingQuery, _) => "City or coordinates required",
            (WeatherError::InvalidCoordinates { .. }, _) => "Invalid coordinates",
            (WeatherError::Status { .. }, Route::Snapshot) => "City not found or API error",
            (WeatherError::Parse { .. }, Route::Snapshot) => "Failed to parse weather data",
            (WeatherError::NoConditions, _) => "No weather data found",
            _ => "Backend error",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message(), self.err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.err {
            e if e.is_bad_request() => StatusCode::BAD_REQUEST,
            WeatherError::Status { .. } if self.route == Route::Snapshot => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.message() }))
    }
}
