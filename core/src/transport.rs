//! The seam between the executor and an HTTP client.
//!
//! The executor only ever calls `Transport::send`. Implementations own
//! everything below the request shape: connections, TLS, redirects, multipart
//! encoding and honouring the abort signal.

use std::future::Future;
use std::sync::Arc;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// An HTTP client able to execute one `HttpRequest`.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        (**self).send(request)
    }
}
