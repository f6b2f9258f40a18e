//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// JSON success response with an explicit status.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    status: StatusCode,
    body: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK.
    pub const fn ok(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// 201 Created.
    pub const fn created(body: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Body carrying only a confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Confirmation text.
    pub message: &'static str,
}

/// Confirmation message response.
#[must_use]
pub const fn message(message: &'static str) -> ApiResponse<MessageResponse> {
    ApiResponse::ok(MessageResponse { message })
}
