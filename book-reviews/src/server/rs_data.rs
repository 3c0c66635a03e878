//! The `{ resultCode, msg, data? }` envelope every endpoint responds with.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Response envelope. The HTTP status is taken from the part of `result_code`
/// before the `-`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RsData<T> {
    pub result_code: String,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> RsData<T> {
    pub fn new(result_code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            result_code: result_code.into(),
            msg: msg.into(),
            data: None,
        }
    }

    pub fn with_data(result_code: impl Into<String>, msg: impl Into<String>, data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::new(result_code, msg)
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.result_code
            .split('-')
            .next()
            .and_then(|prefix| prefix.parse::<u16>().ok())
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl<T: Serialize> IntoResponse for RsData<T> {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
