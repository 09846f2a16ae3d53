//! `Transport` backed by `reqwest`.
//!
//! Fetch-only request fields are mapped onto plain HTTP: cache directives
//! become request headers and `Credentials::Omit` strips credential headers.
//! There is no cookie store, so the other credential policies pass through.

use std::future::Future;

use reqwest::multipart;
use tracing::trace;

use crate::error::TransportError;
use crate::http::{
    CacheMode, Credentials, FormData, FormPart, Headers, HttpRequest, HttpResponse, Payload,
    ResponseType,
};
use crate::transport::Transport;

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        let client = self.client.clone();
        async move {
            let signal = request.signal.clone();
            if signal.as_ref().is_some_and(|signal| signal.is_aborted()) {
                return Err(TransportError::Aborted);
            }
            let builder = build_request(&client, request)?;
            match signal {
                Some(signal) => tokio::select! {
                    result = execute(builder) => result,
                    _ = signal.aborted() => Err(TransportError::Aborted),
                },
                None => execute(builder).await,
            }
        }
    }
}

fn build_request(
    client: &reqwest::Client,
    request: HttpRequest,
) -> Result<reqwest::RequestBuilder, TransportError> {
    let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
        .map_err(TransportError::other)?;

    let mut headers = request.headers;
    if let Some(cache) = request.cache {
        apply_cache_mode(&mut headers, cache);
    }
    if request.credentials == Some(Credentials::Omit) {
        trace!("stripping credential headers");
        headers.remove("authorization");
        headers.remove("cookie");
    }

    let mut builder = client.request(method, &request.url);
    for (name, value) in headers.iter() {
        builder = builder.header(name, value);
    }
    builder = match request.body {
        None => builder,
        Some(Payload::Text(text)) => builder.body(text),
        Some(Payload::Binary(bytes)) => builder.body(bytes),
        Some(Payload::Form(form)) => builder.multipart(to_multipart(form)?),
    };
    Ok(builder)
}

/// Request headers a fetch implementation adds for each cache directive.
fn apply_cache_mode(headers: &mut Headers, cache: CacheMode) {
    let directive = match cache {
        CacheMode::NoStore | CacheMode::Reload => "no-cache",
        CacheMode::NoCache => "max-age=0",
        CacheMode::Default | CacheMode::ForceCache | CacheMode::OnlyIfCached => return,
    };
    if !headers.contains("cache-control") {
        headers.set("cache-control", directive);
    }
    if directive == "no-cache" && !headers.contains("pragma") {
        headers.set("pragma", "no-cache");
    }
}

fn to_multipart(form: FormData) -> Result<multipart::Form, TransportError> {
    let mut encoded = multipart::Form::new();
    for (name, part) in form.into_parts() {
        encoded = match part {
            FormPart::Text(value) => encoded.text(name, value),
            FormPart::File {
                file_name,
                content_type,
                data,
            } => {
                let mut file = multipart::Part::bytes(data.to_vec()).file_name(file_name);
                if let Some(content_type) = content_type {
                    file = file.mime_str(&content_type).map_err(TransportError::other)?;
                }
                encoded.part(name, file)
            }
        };
    }
    Ok(encoded)
}

async fn execute(builder: reqwest::RequestBuilder) -> Result<HttpResponse, TransportError> {
    let response = builder.send().await.map_err(classify)?;
    let status = response.status();
    let url = response.url().to_string();
    let headers: Headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response.bytes().await.map_err(classify)?;
    Ok(HttpResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        headers,
        url,
        response_type: ResponseType::Basic,
        body,
    })
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::other(error)
    }
}
