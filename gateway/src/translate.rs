//! Response translator
//!
//! Turns the outcome of a gateway request into the HTTP response sent back.
//!
//! | Outcome              | Status | Body                                 |
//! |----------------------|--------|--------------------------------------|
//! | Success              | 200    | JSON payload                         |
//! | No matching route    | 404    | `{"error": "Not Found"}`             |
//! | Upstream/serializing | 500    | `{"error": "Internal Server Error"}` |
//! | OPTIONS preflight    | 204    | empty                                |

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use error::{ErrorResponse, GatewayError};
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use serde::Serialize;

use crate::model::ResponsePayload;

/// Response produced for a single request
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl GatewayResponse {
    fn json(status: StatusCode, body: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            status,
            headers,
            body,
        }
    }

    fn error(status: StatusCode, error: &ErrorResponse) -> Self {
        let body = serde_json::to_string(error)
            .unwrap_or_else(|_| format!(r#"{{"error":"{}"}}"#, error.error));
        Self::json(status, body)
    }

    /// Answer to a CORS preflight
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            headers: HeaderMap::new(),
            body: String::new(),
        }
    }
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Translate a request outcome into a response
///
/// Error detail is logged here and never copied into the body.
pub fn translate(result: Result<ResponsePayload, GatewayError>) -> GatewayResponse {
    match result.and_then(|payload| to_json(&payload)) {
        Ok(body) => GatewayResponse::json(StatusCode::OK, body),
        Err(err) => {
            if err.is_not_found() {
                tracing::info!("{}", err);
                GatewayResponse::error(StatusCode::NOT_FOUND, &ErrorResponse::from(&err))
            } else {
                tracing::error!("{}", err);
                GatewayResponse::error(StatusCode::INTERNAL_SERVER_ERROR, &ErrorResponse::from(&err))
            }
        }
    }
}

fn to_json<T: Serialize>(payload: &T) -> Result<String, GatewayError> {
    Ok(serde_json::to_string(payload)?)
}
