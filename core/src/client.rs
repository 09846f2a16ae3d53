//! Request executor.
//!
//! # Design
//! `Client` holds the immutable configuration (base URL, default headers,
//! default credentials policy) and a `Transport`. It carries no mutable state,
//! so one client can serve any number of concurrent calls.
//!
//! Each entry point (`get`, `post`, ...) returns a `PendingRequest` that only
//! captures options. Nothing is sent until a terminal (`json` or `text`) is
//! awaited. `PendingRequest::build` exposes the pure half of the pipeline:
//! header merge, body negotiation, path and query resolution. It yields the
//! `HttpRequest` a transport would receive without doing any I/O.
//!
//! The error-handling mode is a type parameter. `Throwing` clients return
//! `FetchError::Status` for non-2xx responses, `Collect` clients return an
//! `Outcome` whose variant tells success from failure.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::endpoint::Endpoint;
use crate::error::FetchError;
use crate::http::{
    Body, CacheMode, Credentials, FormData, Headers, HttpMethod, HttpRequest, HttpResponse,
    IntoBody, Payload,
};
use crate::query::QueryParams;
use crate::response::{self, Outcome, Response};
use crate::route::{self, PathParams};
use crate::signal::AbortSignal;
use crate::transport::Transport;

/// Non-2xx responses become `FetchError::Status`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Throwing;

/// Every response becomes an `Outcome`; HTTP failures are values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Collect;

/// A result-mode client.
pub type ResultClient<T> = Client<T, Collect>;

/// Construction-time settings shared by every call of a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// Per-call overrides. `None` means "not provided", so the client default applies.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<HttpMethod>,
    pub headers: Headers,
    pub body: Option<Body>,
    pub params: PathParams,
    pub query: QueryParams,
    pub credentials: Option<Credentials>,
    pub base_url: Option<String>,
    pub signal: Option<AbortSignal>,
    pub cache: Option<CacheMode>,
}

#[derive(Debug, Clone)]
pub struct Client<T, M = Throwing> {
    base_url: String,
    headers: Headers,
    credentials: Option<Credentials>,
    transport: T,
    _mode: PhantomData<M>,
}

impl<T: Transport> Client<T> {
    /// Build a throwing-mode client.
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self::from_config(config, transport)
    }

    /// Build a result-mode client.
    pub fn new_result(config: ClientConfig, transport: T) -> ResultClient<T> {
        Client::from_config(config, transport)
    }

    pub fn into_result_mode(self) -> ResultClient<T> {
        self.with_mode()
    }
}

impl<T: Transport> Client<T, Collect> {
    pub fn into_throwing_mode(self) -> Client<T> {
        self.with_mode()
    }
}

impl<T: Transport + Default> Default for Client<T> {
    fn default() -> Self {
        Client::new(ClientConfig::default(), T::default())
    }
}

impl<T: Transport, M> Client<T, M> {
    fn from_config(config: ClientConfig, transport: T) -> Self {
        Self {
            base_url: config
                .base_url
                .strip_suffix('/')
                .unwrap_or(&config.base_url)
                .to_string(),
            headers: config.headers,
            credentials: config.credentials,
            transport,
            _mode: PhantomData,
        }
    }

    fn with_mode<N>(self) -> Client<T, N> {
        Client {
            base_url: self.base_url,
            headers: self.headers,
            credentials: self.credentials,
            transport: self.transport,
            _mode: PhantomData,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn get(&self, path: impl Into<String>) -> PendingRequest<'_, T, M> {
        self.request(HttpMethod::Get, path)
    }

    pub fn post(&self, path: impl Into<String>) -> PendingRequest<'_, T, M> {
        self.request(HttpMethod::Post, path)
    }

    pub fn put(&self, path: impl Into<String>) -> PendingRequest<'_, T, M> {
        self.request(HttpMethod::Put, path)
    }

    pub fn delete(&self, path: impl Into<String>) -> PendingRequest<'_, T, M> {
        self.request(HttpMethod::Delete, path)
    }

    pub fn patch(&self, path: impl Into<String>) -> PendingRequest<'_, T, M> {
        self.request(HttpMethod::Patch, path)
    }

    pub fn request(&self, method: HttpMethod, path: impl Into<String>) -> PendingRequest<'_, T, M> {
        PendingRequest {
            client: self,
            path: path.into(),
            options: RequestOptions {
                method: Some(method),
                ..RequestOptions::default()
            },
            error: None,
        }
    }

    /// Entry point for routes that arrive as untyped data, e.g. from JSON config.
    pub fn request_value(
        &self,
        method: HttpMethod,
        route: &Value,
    ) -> Result<PendingRequest<'_, T, M>, FetchError> {
        match route {
            Value::String(path) => Ok(self.request(method, path.as_str())),
            _ => Err(FetchError::InvalidInvocation(
                "The URL must be a string.".to_string(),
            )),
        }
    }

    /// Start a call to a declared `Endpoint`.
    pub fn call<E: Endpoint>(&self) -> EndpointRequest<'_, T, M, E> {
        EndpointRequest {
            inner: self.request(E::METHOD, E::PATH),
            _endpoint: PhantomData,
        }
    }

    /// The pure half of the pipeline: merge, negotiate, resolve.
    fn prepare(&self, path: &str, options: RequestOptions) -> Result<HttpRequest, FetchError> {
        let mut headers = self.headers.clone();
        headers.merge(&options.headers);
        let body = negotiate_body(options.body, &mut headers)?;

        let resolved = route::resolve(path, &options.params)?;
        let base_url = options.base_url.as_deref().unwrap_or(&self.base_url);
        let mut url = format!("{base_url}{resolved}");
        let query = options.query.to_query_string();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        Ok(HttpRequest {
            method: options.method.unwrap_or_default(),
            url,
            headers,
            body,
            credentials: options.credentials.or(self.credentials),
            cache: options.cache,
            signal: options.signal,
        })
    }
}

/// Decide how `body` goes on the wire. Structured bodies are serialized and
/// force `content-type: application/json`; everything else passes through.
///
/// A JSON string is sent as plain text and a JSON null as no body, so neither
/// touches the headers.
pub fn negotiate_body(
    body: Option<Body>,
    headers: &mut Headers,
) -> Result<Option<Payload>, FetchError> {
    let payload = match body {
        None | Some(Body::Json(Value::Null)) => None,
        Some(Body::Form(form)) => Some(Payload::Form(form)),
        Some(Body::Binary(bytes)) => Some(Payload::Binary(bytes)),
        Some(Body::Text(text)) | Some(Body::Json(Value::String(text))) => Some(Payload::Text(text)),
        Some(Body::Json(value)) => {
            let text = serde_json::to_string(&value).map_err(FetchError::Encode)?;
            trace!(len = text.len(), "encoded structured body as JSON");
            headers.set("content-type", "application/json");
            Some(Payload::Text(text))
        }
    };
    Ok(payload)
}

/// A configured call that has not been sent yet.
#[must_use = "requests are not sent until `json` or `text` is awaited"]
pub struct PendingRequest<'a, T, M> {
    client: &'a Client<T, M>,
    path: String,
    options: RequestOptions,
    error: Option<FetchError>,
}

impl<'a, T: Transport, M> PendingRequest<'a, T, M> {
    fn fail(mut self, error: FetchError) -> Self {
        self.error.get_or_insert(error);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.set(name, value);
        self
    }

    pub fn headers(mut self, headers: &Headers) -> Self {
        self.options.headers.merge(headers);
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.options.body = Some(body.into());
        self
    }

    /// Structured body from any serializable value.
    pub fn json_body<B: Serialize + ?Sized>(self, body: &B) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body(Body::Json(value)),
            Err(err) => self.fail(FetchError::Encode(err)),
        }
    }

    pub fn text_body(self, text: impl Into<String>) -> Self {
        self.body(Body::Text(text.into()))
    }

    pub fn bytes_body(self, bytes: impl Into<bytes::Bytes>) -> Self {
        self.body(Body::Binary(bytes.into()))
    }

    pub fn form(self, form: FormData) -> Self {
        self.body(Body::Form(form))
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.params.insert(name.into(), value.into());
        self
    }

    pub fn params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.options
            .params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.query.insert(key, value);
        self
    }

    /// Query parameters from a struct or map; field order is kept.
    pub fn query_params<Q: Serialize + ?Sized>(mut self, query: &Q) -> Self {
        match self.options.query.extend_from_serialize(query) {
            Ok(()) => self,
            Err(err) => self.fail(err),
        }
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.options.credentials = Some(credentials);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.options.base_url = Some(base_url.into());
        self
    }

    pub fn signal(mut self, signal: AbortSignal) -> Self {
        self.options.signal = Some(signal);
        self
    }

    pub fn cache(mut self, cache: CacheMode) -> Self {
        self.options.cache = Some(cache);
        self
    }

    /// Replace all options at once. The method fixed by the entry point is kept
    /// unless `options.method` is set.
    pub fn options(mut self, options: RequestOptions) -> Self {
        let method = options.method.clone().or(self.options.method.take());
        self.options = RequestOptions { method, ..options };
        self
    }

    /// The request a transport would receive, without sending it.
    pub fn build(self) -> Result<HttpRequest, FetchError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.client.prepare(&self.path, self.options)
    }

    async fn send(self) -> Result<HttpResponse, FetchError> {
        let client = self.client;
        let request = self.build()?;
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = client.transport.send(request).await?;
        debug!(status = response.status, url = %response.url, "received response");
        Ok(response)
    }
}

impl<T: Transport> PendingRequest<'_, T, Throwing> {
    /// Send and parse the body as JSON into `D`.
    pub async fn json<D: DeserializeOwned>(self) -> Result<Response<D>, FetchError> {
        response::normalize_json(self.send().await?)
    }

    /// Send and return the body as text.
    pub async fn text(self) -> Result<Response<String>, FetchError> {
        response::normalize_text(self.send().await?)
    }
}

impl<T: Transport> PendingRequest<'_, T, Collect> {
    /// Send and parse the body as JSON into `D` on success or `E` on failure.
    pub async fn json<D, E>(self) -> Result<Outcome<D, E>, FetchError>
    where
        D: DeserializeOwned,
        E: DeserializeOwned,
    {
        response::collect_json(self.send().await?)
    }

    pub async fn text(self) -> Result<Outcome<String, String>, FetchError> {
        Ok(response::collect_text(self.send().await?))
    }
}

/// A `PendingRequest` whose method, path and payload shapes come from `E`.
#[must_use = "requests are not sent until `json` or `text` is awaited"]
pub struct EndpointRequest<'a, T, M, E> {
    inner: PendingRequest<'a, T, M>,
    _endpoint: PhantomData<fn() -> E>,
}

impl<'a, T: Transport, M, E: Endpoint> EndpointRequest<'a, T, M, E> {
    fn map(self, f: impl FnOnce(PendingRequest<'a, T, M>) -> PendingRequest<'a, T, M>) -> Self {
        Self {
            inner: f(self.inner),
            _endpoint: PhantomData,
        }
    }

    pub fn param(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.map(|inner| inner.param(name, value))
    }

    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.map(|inner| inner.header(name, value))
    }

    pub fn body(self, body: E::Body) -> Self {
        self.map(|mut inner| match IntoBody::into_body(body) {
            Ok(body) => {
                inner.options.body = body;
                inner
            }
            Err(err) => inner.fail(FetchError::Encode(err)),
        })
    }

    pub fn query(self, query: &E::Query) -> Self {
        self.map(|inner| inner.query_params(query))
    }

    pub fn credentials(self, credentials: Credentials) -> Self {
        self.map(|inner| inner.credentials(credentials))
    }

    pub fn base_url(self, base_url: impl Into<String>) -> Self {
        self.map(|inner| inner.base_url(base_url))
    }

    pub fn signal(self, signal: AbortSignal) -> Self {
        self.map(|inner| inner.signal(signal))
    }

    pub fn cache(self, cache: CacheMode) -> Self {
        self.map(|inner| inner.cache(cache))
    }

    pub fn build(self) -> Result<HttpRequest, FetchError> {
        self.inner.build()
    }
}

impl<T: Transport, E: Endpoint> EndpointRequest<'_, T, Throwing, E> {
    pub async fn json(self) -> Result<Response<E::Success>, FetchError> {
        self.inner.json().await
    }

    pub async fn text(self) -> Result<Response<String>, FetchError> {
        self.inner.text().await
    }
}

impl<T: Transport, E: Endpoint> EndpointRequest<'_, T, Collect, E> {
    pub async fn json(self) -> Result<Outcome<E::Success, E::Error>, FetchError> {
        self.inner.json().await
    }

    pub async fn text(self) -> Result<Outcome<String, String>, FetchError> {
        self.inner.text().await
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::error::{ErrorData, TransportError};
    use crate::http::{Json, ResponseType};
    use crate::signal::AbortController;

    /// Records every request and answers with a canned response.
    #[derive(Clone)]
    struct StubTransport {
        requests: Arc<Mutex<Vec<HttpRequest>>>,
        status: u16,
        status_text: &'static str,
        body: &'static str,
    }

    impl StubTransport {
        fn replying(status: u16, status_text: &'static str, body: &'static str) -> Self {
            Self {
                requests: Arc::default(),
                status,
                status_text,
                body,
            }
        }

        fn sent(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for StubTransport {
        fn send(
            &self,
            request: HttpRequest,
        ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
            let aborted = request.signal.as_ref().is_some_and(|s| s.is_aborted());
            let url = request.url.clone();
            self.requests.lock().unwrap().push(request);
            let result = if aborted {
                Err(TransportError::Aborted)
            } else {
                Ok(HttpResponse {
                    status: self.status,
                    status_text: self.status_text.to_string(),
                    headers: [("content-type", "application/json")].into_iter().collect(),
                    url,
                    response_type: ResponseType::Basic,
                    body: Bytes::from_static(self.body.as_bytes()),
                })
            };
            std::future::ready(result)
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::new("https://example.com/").header("x-api-key", "123")
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = Client::new(config(), StubTransport::replying(200, "OK", "{}"));
        assert_eq!(client.base_url(), "https://example.com");
    }

    #[test]
    fn only_one_trailing_slash_is_stripped() {
        let client = Client::new(
            ClientConfig::new("https://example.com//"),
            StubTransport::replying(200, "OK", "{}"),
        );
        assert_eq!(client.base_url(), "https://example.com/");
        let req = client.get("/posts").build().unwrap();
        assert_eq!(req.url, "https://example.com//posts");
    }

    #[test]
    fn build_resolves_path_params() {
        let client = Client::new(config(), StubTransport::replying(200, "OK", "{}"));
        let req = client.get("/posts/:id").param("id", "12").build().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://example.com/posts/12");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_appends_query_in_insertion_order() {
        let client = Client::new(config(), StubTransport::replying(200, "OK", "[]"));
        let req = client
            .get("/users")
            .query("page", 1)
            .query("active", true)
            .build()
            .unwrap();
        assert_eq!(req.url, "https://example.com/users?page=1&active=true");
    }

    #[test]
    fn build_omits_question_mark_without_query() {
        let client = Client::new(config(), StubTransport::replying(200, "OK", "[]"));
        let req = client.get("/users").build().unwrap();
        assert_eq!(req.url, "https://example.com/users");
    }

    #[test]
    fn structured_body_forces_json_content_type() {
        let client = Client::new(config(), StubTransport::replying(201, "Created", "{}"));
        let req = client
            .post("/posts")
            .header("Content-Type", "text/plain")
            .body(json!({"title": "foo"}))
            .build()
            .unwrap();
        assert_eq!(req.headers.get("content-type"), Some("application/json"));
        assert_eq!(
            req.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("content-type")).count(),
            1
        );
        assert_eq!(req.body, Some(Payload::Text(r#"{"title":"foo"}"#.to_string())));
    }

    #[test]
    fn string_body_passes_through_untouched() {
        let client = Client::new(config(), StubTransport::replying(200, "OK", "{}"));
        let req = client
            .put("/notes/:id")
            .param("id", "1")
            .text_body("  raw {text} ")
            .build()
            .unwrap();
        assert_eq!(req.body, Some(Payload::Text("  raw {text} ".to_string())));
        assert!(!req.headers.contains("content-type"));
    }

    #[test]
    fn json_string_body_is_sent_as_plain_text() {
        let client = Client::new(config(), StubTransport::replying(200, "OK", "{}"));
        let req = client
            .post("/notes")
            .header("content-type", "text/csv")
            .json_body("a,b")
            .build()
            .unwrap();
        assert_eq!(req.body, Some(Payload::Text("a,b".to_string())));
        assert_eq!(req.headers.get("content-type"), Some("text/csv"));
    }

    #[test]
    fn null_body_sends_nothing() {
        let client = Client::new(config(), StubTransport::replying(200, "OK", "{}"));
        let req = client.post("/notes").body(Value::Null).build().unwrap();
        assert!(req.body.is_none());
        assert!(!req.headers.contains("content-type"));

        let req = client.post("/notes").json_body(&()).build().unwrap();
        assert!(req.body.is_none());
        assert!(!req.headers.contains("content-type"));
    }

    #[test]
    fn form_body_never_gets_content_type() {
        let client = Client::new(config(), StubTransport::replying(200, "OK", "{}"));
        let form = FormData::new().text("title", "foo");
        let req = client.post("/upload").form(form.clone()).build().unwrap();
        assert_eq!(req.body, Some(Payload::Form(form)));
        assert!(!req.headers.contains("content-type"));
    }

    #[test]
    fn binary_body_passes_through() {
        let client = Client::new(config(), StubTransport::replying(200, "OK", "{}"));
        let req = client
            .post("/blob")
            .bytes_body(vec![0u8, 159, 146, 150])
            .build()
            .unwrap();
        assert_eq!(req.body.as_ref().and_then(Payload::as_bytes), Some(&[0u8, 159, 146, 150][..]));
    }

    #[test]
    fn call_headers_override_defaults() {
        let client = Client::new(config(), StubTransport::replying(200, "OK", "{}"));
        let req = client
            .get("/me")
            .header("X-Api-Key", "override")
            .header("accept", "text/plain")
            .build()
            .unwrap();
        assert_eq!(req.headers.get("x-api-key"), Some("override"));
        assert_eq!(req.headers.get("accept"), Some("text/plain"));
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn overrides_apply_only_when_provided() {
        let client = Client::new(
            config().credentials(Credentials::Include),
            StubTransport::replying(200, "OK", "{}"),
        );
        let req = client.get("/a").build().unwrap();
        assert_eq!(req.credentials, Some(Credentials::Include));
        assert_eq!(req.url, "https://example.com/a");

        let req = client
            .get("/a")
            .credentials(Credentials::Omit)
            .base_url("http://localhost:8080")
            .build()
            .unwrap();
        assert_eq!(req.credentials, Some(Credentials::Omit));
        assert_eq!(req.url, "http://localhost:8080/a");
    }

    #[test]
    fn empty_base_url_is_allowed() {
        let client = Client::new(ClientConfig::default(), StubTransport::replying(200, "OK", "{}"));
        let req = client.get("/relative").build().unwrap();
        assert_eq!(req.url, "/relative");
    }

    #[test]
    fn options_replace_keeps_entry_point_method() {
        let client = Client::new(config(), StubTransport::replying(200, "OK", "{}"));
        let mut options = RequestOptions::default();
        options.params.insert("id".to_string(), "5".to_string());
        options.cache = Some(CacheMode::NoStore);
        let req = client.delete("/posts/:id").options(options).build().unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "https://example.com/posts/5");
        assert_eq!(req.cache, Some(CacheMode::NoStore));
    }

    #[test]
    fn config_deserializes_from_json() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"baseUrl":"https://api.example.com/","headers":{"x-api-key":"123"},"credentials":"include"}"#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.com/");
        assert_eq!(config.headers.get("x-api-key"), Some("123"));
        assert_eq!(config.credentials, Some(Credentials::Include));
    }

    #[tokio::test]
    async fn post_sends_json_and_parses_response() {
        let transport = StubTransport::replying(201, "Created", r#"{"id":101,"title":"foo"}"#);
        let client = Client::new(config(), transport.clone());
        let res: Response<Value> = client
            .post("/posts")
            .json_body(&json!({"title": "foo"}))
            .json()
            .await
            .unwrap();
        assert_eq!(res.status, 201);
        assert_eq!(res.data["id"], 101);

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].headers.get("content-type"), Some("application/json"));
        assert_eq!(sent[0].headers.get("x-api-key"), Some("123"));
        assert_eq!(sent[0].body, Some(Payload::Text(r#"{"title":"foo"}"#.to_string())));
    }

    #[tokio::test]
    async fn missing_param_fails_before_transport() {
        let transport = StubTransport::replying(200, "OK", "{}");
        let client = Client::new(config(), transport.clone());
        let err = client
            .get("/a/:x/:y")
            .param("x", "1")
            .json::<Value>()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingParameter { ref name } if name == "y"));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn pending_request_is_lazy() {
        let transport = StubTransport::replying(200, "OK", "{}");
        let client = Client::new(config(), transport.clone());
        let pending = client.get("/posts");
        assert!(transport.sent().is_empty());
        pending.text().await.unwrap();
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn throwing_mode_raises_status_error() {
        let transport = StubTransport::replying(404, "Not Found", r#"{"message":"missing"}"#);
        let client = Client::new(config(), transport);
        let err = client
            .get("/posts/:id")
            .param("id", "999")
            .json::<Value>()
            .await
            .unwrap_err();
        let status = crate::error::api_error(&err).unwrap();
        assert_eq!(status.status, 404);
        assert_eq!(status.data, ErrorData::Json(json!({"message": "missing"})));
    }

    #[tokio::test]
    async fn result_mode_returns_failure_outcome() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Missing {
            message: String,
        }

        let transport = StubTransport::replying(404, "Not Found", r#"{"message":"missing"}"#);
        let client = Client::new_result(config(), transport);
        let outcome = client
            .get("/posts/:id")
            .param("id", "999")
            .json::<Value, Missing>()
            .await
            .unwrap();
        assert!(!outcome.ok());
        assert_eq!(outcome.status(), 404);
        assert_eq!(
            outcome.failure().unwrap().data,
            Missing {
                message: "missing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn switching_modes_keeps_configuration() {
        let transport = StubTransport::replying(500, "Internal Server Error", "boom");
        let client = Client::new(config(), transport).into_result_mode();
        assert_eq!(client.base_url(), "https://example.com");
        let outcome = client.get("/x").text().await.unwrap();
        assert!(!outcome.ok());

        let client = client.into_throwing_mode();
        let err = client.get("/x").text().await.unwrap_err();
        assert_eq!(err.as_status().unwrap().data, ErrorData::Text("boom".to_string()));
    }

    #[tokio::test]
    async fn aborted_signal_surfaces_as_transport_error() {
        let transport = StubTransport::replying(200, "OK", "{}");
        let client = Client::new_result(config(), transport);
        let controller = AbortController::new();
        controller.abort();
        let err = client
            .get("/slow")
            .signal(controller.signal())
            .text()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(TransportError::Aborted)));
    }

    #[tokio::test]
    async fn request_value_rejects_non_string_route() {
        let transport = StubTransport::replying(200, "OK", "{}");
        let client = Client::new(config(), transport.clone());
        let err = client
            .request_value(HttpMethod::Get, &json!(42))
            .err()
            .unwrap();
        assert!(matches!(err, FetchError::InvalidInvocation(_)));

        let res = client
            .request_value(HttpMethod::Get, &json!("/posts"))
            .unwrap()
            .json::<Value>()
            .await
            .unwrap();
        assert_eq!(res.url, "https://example.com/posts");
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn query_params_from_struct() {
        #[derive(Serialize)]
        struct Filter {
            #[serde(rename = "userId")]
            user_id: u32,
            #[serde(skip_serializing_if = "Option::is_none")]
            tag: Option<String>,
        }

        let transport = StubTransport::replying(200, "OK", "[]");
        let client = Client::new(config(), transport.clone());
        client
            .get("/posts")
            .query_params(&Filter {
                user_id: 3,
                tag: None,
            })
            .json::<Vec<Value>>()
            .await
            .unwrap();
        assert_eq!(transport.sent()[0].url, "https://example.com/posts?userId=3");
    }

    struct CreatePost;

    #[derive(Serialize)]
    struct NewPost {
        title: String,
    }

    #[derive(Debug, Deserialize)]
    struct Post {
        id: u32,
        title: String,
    }

    #[derive(Debug, Deserialize)]
    struct ApiFailure {
        message: String,
    }

    impl Endpoint for CreatePost {
        const METHOD: HttpMethod = HttpMethod::Post;
        const PATH: &'static str = "/users/:userId/posts";
        type Success = Post;
        type Error = ApiFailure;
        type Body = Json<NewPost>;
        type Query = ();
    }

    #[tokio::test]
    async fn endpoint_call_uses_declared_shapes() {
        let transport = StubTransport::replying(201, "Created", r#"{"id":7,"title":"hi"}"#);
        let client = Client::new(config(), transport.clone());
        let res = client
            .call::<CreatePost>()
            .param("userId", "3")
            .body(Json(NewPost {
                title: "hi".to_string(),
            }))
            .json()
            .await
            .unwrap();
        assert_eq!(res.data.id, 7);
        assert_eq!(res.data.title, "hi");

        let sent = transport.sent();
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].url, "https://example.com/users/3/posts");
        assert_eq!(CreatePost::required_params(), vec!["userId".to_string()]);
    }

    #[tokio::test]
    async fn endpoint_call_in_result_mode_decodes_error_shape() {
        let transport = StubTransport::replying(422, "Unprocessable Entity", r#"{"message":"title required"}"#);
        let client = Client::new_result(config(), transport);
        let outcome = client
            .call::<CreatePost>()
            .param("userId", "3")
            .body(Json(NewPost {
                title: String::new(),
            }))
            .json()
            .await
            .unwrap();
        match outcome {
            Outcome::Failure(res) => assert_eq!(res.data.message, "title required"),
            Outcome::Success(res) => panic!("unexpected success: {:?}", res.data),
        }
    }

    struct UploadCsv;

    impl Endpoint for UploadCsv {
        const METHOD: HttpMethod = HttpMethod::Put;
        const PATH: &'static str = "/reports/:name";
        type Success = Value;
        type Error = Value;
        type Body = String;
        type Query = ();
    }

    struct UploadAvatar;

    impl Endpoint for UploadAvatar {
        const METHOD: HttpMethod = HttpMethod::Post;
        const PATH: &'static str = "/avatars";
        type Success = Value;
        type Error = Value;
        type Body = FormData;
        type Query = ();
    }

    #[test]
    fn endpoint_text_body_keeps_caller_content_type() {
        let client = Client::new(config(), StubTransport::replying(200, "OK", "{}"));
        let req = client
            .call::<UploadCsv>()
            .param("name", "q1")
            .header("content-type", "text/csv")
            .body("a,b".to_string())
            .build()
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "https://example.com/reports/q1");
        assert_eq!(req.body, Some(Payload::Text("a,b".to_string())));
        assert_eq!(req.headers.get("content-type"), Some("text/csv"));
    }

    #[test]
    fn endpoint_form_body_passes_through() {
        let client = Client::new(config(), StubTransport::replying(201, "Created", "{}"));
        let form = FormData::new().text("user", "3");
        let req = client.call::<UploadAvatar>().body(form.clone()).build().unwrap();
        assert_eq!(req.body, Some(Payload::Form(form)));
        assert!(!req.headers.contains("content-type"));
    }

    #[test]
    fn endpoint_structured_body_is_json() {
        let client = Client::new(config(), StubTransport::replying(201, "Created", "{}"));
        let req = client
            .call::<CreatePost>()
            .param("userId", "3")
            .body(Json(NewPost {
                title: "hi".to_string(),
            }))
            .build()
            .unwrap();
        assert_eq!(req.body, Some(Payload::Text(r#"{"title":"hi"}"#.to_string())));
        assert_eq!(req.headers.get("content-type"), Some("application/json"));
    }
}
