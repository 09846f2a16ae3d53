//! Response envelopes and normalization.
//!
//! # Design
//! Normalization turns a transport `HttpResponse` into a `Response<D>` in one
//! of two ways. Throwing normalization (`normalize_json`, `normalize_text`)
//! returns the envelope for 2xx and `FetchError::Status` otherwise. Collecting
//! normalization (`collect_json`, `collect_text`) always returns an `Outcome`
//! whose variant is the `ok` discriminant. In both, the body is parsed in the
//! mode the caller chose, regardless of status.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ErrorData, FetchError, StatusError};
use crate::http::{Headers, HttpResponse, ResponseType};

/// Uniform response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<D> {
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    pub url: String,
    pub response_type: ResponseType,
    pub data: D,
}

impl<D> Response<D> {
    /// `true` for statuses in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn map<U>(self, f: impl FnOnce(D) -> U) -> Response<U> {
        Response {
            status: self.status,
            status_text: self.status_text,
            headers: self.headers,
            url: self.url,
            response_type: self.response_type,
            data: f(self.data),
        }
    }
}

/// Result-mode envelope: `Success` carries the success shape, `Failure` the
/// error shape. Neither is an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<D, E> {
    Success(Response<D>),
    Failure(Response<E>),
}

impl<D, E> Outcome<D, E> {
    /// The `ok` discriminant: `true` iff the status is 2xx.
    pub fn ok(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn status(&self) -> u16 {
        match self {
            Outcome::Success(response) => response.status,
            Outcome::Failure(response) => response.status,
        }
    }

    pub fn status_text(&self) -> &str {
        match self {
            Outcome::Success(response) => &response.status_text,
            Outcome::Failure(response) => &response.status_text,
        }
    }

    pub fn headers(&self) -> &Headers {
        match self {
            Outcome::Success(response) => &response.headers,
            Outcome::Failure(response) => &response.headers,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Outcome::Success(response) => &response.url,
            Outcome::Failure(response) => &response.url,
        }
    }

    pub fn success(&self) -> Option<&Response<D>> {
        match self {
            Outcome::Success(response) => Some(response),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Response<E>> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(response) => Some(response),
        }
    }

    pub fn into_result(self) -> Result<Response<D>, Response<E>> {
        match self {
            Outcome::Success(response) => Ok(response),
            Outcome::Failure(response) => Err(response),
        }
    }
}

/// Move the metadata of a transport response into an envelope, leaving the
/// body for one of the consuming reads.
fn envelope(mut response: HttpResponse) -> (Response<()>, HttpResponse) {
    let meta = Response {
        status: response.status,
        status_text: std::mem::take(&mut response.status_text),
        headers: std::mem::take(&mut response.headers),
        url: std::mem::take(&mut response.url),
        response_type: response.response_type,
        data: (),
    };
    (meta, response)
}

fn status_error(meta: Response<()>, data: ErrorData) -> FetchError {
    FetchError::Status(StatusError {
        status: meta.status,
        status_text: meta.status_text,
        url: meta.url,
        headers: meta.headers,
        response_type: meta.response_type,
        data,
    })
}

/// Throwing normalization in `json` mode.
pub fn normalize_json<D: DeserializeOwned>(response: HttpResponse) -> Result<Response<D>, FetchError> {
    let success = response.is_success();
    let (meta, response) = envelope(response);
    if success {
        let data = response.json::<D>().map_err(FetchError::Decode)?;
        return Ok(meta.map(|_| data));
    }
    let data = response.json::<Value>().map_err(FetchError::Decode)?;
    Err(status_error(meta, ErrorData::Json(data)))
}

/// Throwing normalization in `text` mode.
pub fn normalize_text(response: HttpResponse) -> Result<Response<String>, FetchError> {
    let success = response.is_success();
    let (meta, response) = envelope(response);
    let data = response.text();
    if success {
        return Ok(meta.map(|_| data));
    }
    Err(status_error(meta, ErrorData::Text(data)))
}

/// Result-mode normalization in `json` mode.
pub fn collect_json<D, E>(response: HttpResponse) -> Result<Outcome<D, E>, FetchError>
where
    D: DeserializeOwned,
    E: DeserializeOwned,
{
    let success = response.is_success();
    let (meta, response) = envelope(response);
    if success {
        let data = response.json::<D>().map_err(FetchError::Decode)?;
        return Ok(Outcome::Success(meta.map(|_| data)));
    }
    let data = response.json::<E>().map_err(FetchError::Decode)?;
    Ok(Outcome::Failure(meta.map(|_| data)))
}

/// Result-mode normalization in `text` mode.
pub fn collect_text(response: HttpResponse) -> Outcome<String, String> {
    let success = response.is_success();
    let (meta, response) = envelope(response);
    let data = response.text();
    if success {
        Outcome::Success(meta.map(|_| data))
    } else {
        Outcome::Failure(meta.map(|_| data))
    }
}
