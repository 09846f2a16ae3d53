//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! executor builds an `HttpRequest`, hands it to a `Transport`, and normalizes
//! the `HttpResponse` that comes back. Nothing in this module touches the
//! network, so every step before and after the round-trip stays deterministic
//! and easy to test.
//!
//! Caller-facing bodies (`Body`) and transport-facing bodies (`Payload`) are
//! separate types: a structured JSON body never reaches the transport, it is
//! serialized during negotiation.

use std::fmt;

use bytes::Bytes;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::signal::AbortSignal;

/// HTTP method for a request. Defaults to `GET`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    /// Any other method token, sent verbatim.
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Other(method) => method,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for HttpMethod {
    fn from(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "PATCH" => HttpMethod::Patch,
            _ => HttpMethod::Other(method.to_string()),
        }
    }
}

/// Ordered header list with case-insensitive name lookup.
///
/// `set` replaces every existing value for a name, `append` keeps them (needed
/// for repeated response headers such as `set-cookie`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replace all values for `name`, keeping the position of the first one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let mut replaced = false;
        self.0.retain_mut(|(key, existing)| {
            if !key.eq_ignore_ascii_case(&name) {
                return true;
            }
            if replaced {
                return false;
            }
            replaced = true;
            *key = name.clone();
            *existing = value.clone();
            true
        });
        if !replaced {
            self.0.push((name, value));
        }
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    }

    /// Overlay `other` on top of `self`; `other` wins key by key.
    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Headers, A::Error> {
                let mut headers = Headers::new();
                while let Some((name, value)) = map.next_entry::<String, String>()? {
                    headers.set(name, value);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

/// Credentials policy forwarded to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
    Omit,
    SameOrigin,
    Include,
}

impl Credentials {
    pub fn as_str(&self) -> &'static str {
        match self {
            Credentials::Omit => "omit",
            Credentials::SameOrigin => "same-origin",
            Credentials::Include => "include",
        }
    }
}

/// Fetch cache directive forwarded to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    Default,
    NoStore,
    Reload,
    NoCache,
    ForceCache,
    OnlyIfCached,
}

/// Transport-level classification of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Basic,
    Cors,
    #[default]
    Default,
    Error,
    Opaque,
    OpaqueRedirect,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Default => "default",
            ResponseType::Error => "error",
            ResponseType::Opaque => "opaque",
            ResponseType::OpaqueRedirect => "opaqueredirect",
        }
    }
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text(String),
    File {
        file_name: String,
        content_type: Option<String>,
        data: Bytes,
    },
}

/// Multipart form container. The transport encodes it and picks the boundary,
/// so the executor never sets a content-type for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    parts: Vec<(String, FormPart)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), FormPart::Text(value.into())));
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<&str>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.parts.push((
            name.into(),
            FormPart::File {
                file_name: file_name.into(),
                content_type: content_type.map(str::to_string),
                data: data.into(),
            },
        ));
        self
    }

    pub fn parts(&self) -> &[(String, FormPart)] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<(String, FormPart)> {
        self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Request body as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Structured payload, serialized to JSON during negotiation.
    Json(Value),
    /// Sent byte-for-byte; the caller owns the content-type.
    Text(String),
    /// Raw binary payload, sent unmodified.
    Binary(Bytes),
    /// Multipart form, encoded by the transport.
    Form(FormData),
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Binary(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Binary(Bytes::from(bytes))
    }
}

impl From<FormData> for Body {
    fn from(form: FormData) -> Self {
        Body::Form(form)
    }
}

/// Serializable value sent as a structured JSON body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

/// Values a typed route can declare as its request body.
pub trait IntoBody {
    /// `Ok(None)` sends no body.
    fn into_body(self) -> Result<Option<Body>, serde_json::Error>;
}

impl IntoBody for () {
    fn into_body(self) -> Result<Option<Body>, serde_json::Error> {
        Ok(None)
    }
}

impl IntoBody for Body {
    fn into_body(self) -> Result<Option<Body>, serde_json::Error> {
        Ok(Some(self))
    }
}

impl<B: IntoBody> IntoBody for Option<B> {
    fn into_body(self) -> Result<Option<Body>, serde_json::Error> {
        self.map_or(Ok(None), IntoBody::into_body)
    }
}

impl IntoBody for String {
    fn into_body(self) -> Result<Option<Body>, serde_json::Error> {
        Ok(Some(Body::Text(self)))
    }
}

impl IntoBody for &str {
    fn into_body(self) -> Result<Option<Body>, serde_json::Error> {
        Ok(Some(Body::Text(self.to_string())))
    }
}

impl IntoBody for Bytes {
    fn into_body(self) -> Result<Option<Body>, serde_json::Error> {
        Ok(Some(Body::Binary(self)))
    }
}

impl IntoBody for FormData {
    fn into_body(self) -> Result<Option<Body>, serde_json::Error> {
        Ok(Some(Body::Form(self)))
    }
}

impl IntoBody for Value {
    fn into_body(self) -> Result<Option<Body>, serde_json::Error> {
        Ok(Some(Body::Json(self)))
    }
}

impl<T: Serialize> IntoBody for Json<T> {
    fn into_body(self) -> Result<Option<Body>, serde_json::Error> {
        serde_json::to_value(&self.0).map(|value| Some(Body::Json(value)))
    }
}

/// Request body as handed to the transport, after negotiation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Binary(Bytes),
    Form(FormData),
}

impl Payload {
    /// Raw bytes for text and binary payloads; `None` for forms.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Text(text) => Some(text.as_bytes()),
            Payload::Binary(bytes) => Some(bytes),
            Payload::Form(_) => None,
        }
    }
}

/// A fully negotiated HTTP request described as plain data.
///
/// Built by `PendingRequest::build`. A `Transport` executes it and returns the
/// corresponding `HttpResponse`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Payload>,
    pub credentials: Option<Credentials>,
    pub cache: Option<CacheMode>,
    pub signal: Option<AbortSignal>,
}

/// An HTTP response described as plain data.
///
/// The body reads (`json`, `text`) consume the response, so each can happen at
/// most once.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    /// Final URL after any redirects followed by the transport.
    pub url: String,
    pub response_type: ResponseType,
    pub body: Bytes,
}

impl HttpResponse {
    /// `true` for statuses in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
