use axum::{http::StatusCode, response::{IntoResponse, Response}};
use std::fmt::Display;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(e: impl Display) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: e.to_string() }
    }

    pub fn not_found(what: impl Display) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: format!("{what} not found") }
    }

    pub fn internal(e: impl Display) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: e.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response { (self.status, self.message).into_response() }
}
