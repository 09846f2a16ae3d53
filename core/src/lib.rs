//! Typed HTTP request helper.
//!
//! # Overview
//! A `Client` turns route templates such as `/posts/:id` plus per-call
//! options into concrete HTTP requests, sends them through a pluggable
//! `Transport`, and normalizes the responses into a uniform envelope.
//!
//! # Design
//! - Route templates are resolved by pure functions in `route`; a missing
//!   path parameter fails before any I/O.
//! - The pipeline before the network (`PendingRequest::build`) and after it
//!   (`response::normalize_*`, `response::collect_*`) is pure data in, data
//!   out. Only `Transport::send` touches the network.
//! - Calls are lazy builders: nothing is sent until `json` or `text` is awaited.
//! - The error-handling mode is part of the client type: throwing clients
//!   return `FetchError::Status` for non-2xx, result clients return `Outcome`.
//! - `Endpoint` declarations bind a route and method to typed payload shapes.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod query;
#[cfg(feature = "reqwest")]
pub mod reqwest_transport;
pub mod response;
pub mod route;
pub mod signal;
pub mod transport;

pub use client::{
    Client, ClientConfig, Collect, EndpointRequest, PendingRequest, RequestOptions, ResultClient,
    Throwing,
};
pub use endpoint::Endpoint;
pub use error::{api_error, is_api_error, ErrorData, FetchError, StatusError, TransportError};
pub use http::{
    Body, CacheMode, Credentials, FormData, FormPart, Headers, HttpMethod, HttpRequest,
    HttpResponse, IntoBody, Json, Payload, ResponseType,
};
pub use query::QueryParams;
#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;
pub use response::{Outcome, Response};
pub use route::{required_params, resolve, PathParams};
pub use signal::{AbortController, AbortSignal};
pub use transport::Transport;
