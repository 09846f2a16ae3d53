//! Error types for the request executor.
//!
//! # Design
//! `FetchError` covers everything that can stop a call: malformed input caught
//! before any I/O (`MissingParameter`, `InvalidInvocation`, `Encode`), a
//! failed exchange (`Transport`), an unreadable body (`Decode`), and, for
//! throwing-mode clients only, a non-2xx response (`Status`). Result-mode
//! clients never produce `Status`; HTTP failures come back as
//! `Outcome::Failure` values instead.
//!
//! Callers narrow to the status error through `api_error`, which walks the
//! `source()` chain instead of relying on the outer type, so errors wrapped in
//! `Box<dyn Error>` or application error enums still narrow.

use std::error::Error as StdError;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::http::{Headers, ResponseType};

/// Errors returned by the request executor.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A `:name` token in the route had no value in the path parameters.
    #[error("missing URL parameter: {name}")]
    MissingParameter { name: String },

    /// The call itself was malformed, e.g. a route that is not a string.
    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),

    /// The request body or query could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The transport failed to complete the exchange.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// Throwing mode only: the response status is outside 2xx.
    #[error("{0}")]
    Status(#[from] StatusError),

    /// The response body could not be parsed in the selected mode.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl FetchError {
    pub fn as_status(&self) -> Option<&StatusError> {
        match self {
            FetchError::Status(status) => Some(status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}

/// Failures of the underlying HTTP client.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request's abort signal fired before a response arrived.
    #[error("request aborted")]
    Aborted,

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport failure: {message}")]
    Other {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl TransportError {
    pub fn other<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        TransportError::Other {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        TransportError::Other {
            message: message.into(),
            source: None,
        }
    }
}

/// Parsed body of a failed response.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorData {
    Json(Value),
    Text(String),
}

impl ErrorData {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ErrorData::Json(value) => Some(value),
            ErrorData::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ErrorData::Json(_) => None,
            ErrorData::Text(text) => Some(text),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ErrorData::Json(value) => value,
            ErrorData::Text(text) => Value::String(text),
        }
    }
}

/// A response whose status is outside 2xx, raised by throwing-mode clients.
#[derive(Debug, Clone, Error)]
#[error("HTTP {status} {status_text}")]
pub struct StatusError {
    pub status: u16,
    pub status_text: String,
    pub url: String,
    pub headers: Headers,
    pub response_type: ResponseType,
    pub data: ErrorData,
}

impl StatusError {
    pub fn data(&self) -> &ErrorData {
        &self.data
    }

    /// Deserialize the error body into the shape declared for the route.
    pub fn data_as<E: DeserializeOwned>(&self) -> Result<E, serde_json::Error> {
        serde_json::from_value(self.data.clone().into_value())
    }
}

/// Find a `StatusError` in `error` or anywhere in its `source()` chain.
pub fn api_error<'a>(error: &'a (dyn StdError + 'static)) -> Option<&'a StatusError> {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(status) = err.downcast_ref::<StatusError>() {
            return Some(status);
        }
        current = err.source();
    }
    None
}

/// `true` when `error` carries an HTTP status failure.
pub fn is_api_error(error: &(dyn StdError + 'static)) -> bool {
    api_error(error).is_some()
}
