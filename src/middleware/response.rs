use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Success envelope: a human-readable `message` plus named payload keys,
/// e.g. `{ "message": "...", "count": 2, "courses": [...] }`.
#[derive(Debug)]
pub struct ApiResponse {
    status_code: StatusCode,
    body: Map<String, Value>,
    serialize_error: Option<String>,
}

impl ApiResponse {
    /// Create a response with a custom status code
    pub fn with_status(status_code: StatusCode, message: impl Into<String>) -> Self {
        let mut body = Map::new();
        body.insert("message".to_string(), Value::String(message.into()));
        Self {
            status_code,
            body,
            serialize_error: None,
        }
    }

    /// 200 OK
    pub fn ok(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message)
    }

    /// 201 Created
    pub fn created(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, message)
    }

    /// Attach a payload key. The first serialization failure turns the whole
    /// response into a 500.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        if self.serialize_error.is_some() {
            return self;
        }
        match serde_json::to_value(value) {
            Ok(value) => {
                self.body.insert(key.to_string(), value);
            }
            Err(e) => self.serialize_error = Some(format!("{}: {}", key, e)),
        }
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        if let Some(err) = self.serialize_error {
            tracing::error!("Failed to serialize response data: {}", err);
            return ApiError::internal_with_detail("Failed to serialize response data", err).into_response();
        }
        (self.status_code, Json(Value::Object(self.body))).into_response()
    }
}

pub type ApiResult = Result<ApiResponse, ApiError>;
