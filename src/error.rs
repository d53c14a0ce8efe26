//! Error types for the bridge
//!
//! Every failure a handler can hit maps onto one of four client-visible
//! outcomes: malformed body (400), missing field (400), unknown item (404) or
//! internal error (500).

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Bridge-wide result type
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Which request field a not-found error echoes back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupField {
    Key,
    Citekey,
}

/// Bridge error type
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Invalid JSON: {0}")]
    MalformedRequest(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{what}: {value}")]
    NotFound {
        what: &'static str,
        field: LookupField,
        value: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Item store did not respond within {0:?}")]
    Timeout(Duration),
}

impl BridgeError {
    pub fn item_not_found(key: impl Into<String>) -> Self {
        BridgeError::NotFound {
            what: "Item not found",
            field: LookupField::Key,
            value: key.into(),
        }
    }

    pub fn parent_not_found(key: impl Into<String>) -> Self {
        BridgeError::NotFound {
            what: "Parent item not found",
            field: LookupField::Key,
            value: key.into(),
        }
    }

    pub fn citekey_not_found(citekey: impl Into<String>) -> Self {
        BridgeError::NotFound {
            what: "Item not found for citekey",
            field: LookupField::Citekey,
            value: citekey.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::MalformedRequest(_) | BridgeError::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }
            BridgeError::NotFound { .. } => StatusCode::NOT_FOUND,
            BridgeError::Internal(_) | BridgeError::Store(_) | BridgeError::Timeout(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    citekey: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            key: None,
            citekey: None,
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            BridgeError::MalformedRequest(message) => {
                ErrorResponse::new("Invalid JSON").with_message(message)
            }
            BridgeError::MissingField(field) => {
                ErrorResponse::new(format!("Missing required field: {}", field))
            }
            BridgeError::NotFound { what, field, value } => {
                let mut body = ErrorResponse::new(what);
                match field {
                    LookupField::Key => body.key = Some(value),
                    LookupField::Citekey => body.citekey = Some(value),
                }
                body
            }
            BridgeError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                ErrorResponse::new("Internal error").with_message(message)
            }
            BridgeError::Store(e) => {
                tracing::error!("Store error: {}", e);
                ErrorResponse::new("Internal error").with_message(e.to_string())
            }
            e @ BridgeError::Timeout(_) => {
                tracing::error!("{}", e);
                ErrorResponse::new("Internal error").with_message(e.to_string())
            }
        };

        (status, Json(body)).into_response()
    }
}
