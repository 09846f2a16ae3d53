//! Typed route declarations.
//!
//! An `Endpoint` binds one method on one route template to the shapes it
//! exchanges. `Client::call` uses it to fix the method and path and to decode
//! payloads into the declared types, so a mismatch between a call site and its
//! route is a compile error rather than a runtime surprise. Path parameters
//! are still checked at runtime by `route::resolve`.
//!
//! ```ignore
//! struct GetPost;
//!
//! impl Endpoint for GetPost {
//!     const METHOD: HttpMethod = HttpMethod::Get;
//!     const PATH: &'static str = "/posts/:id";
//!     type Success = Post;
//!     type Error = ApiFailure;
//!     type Body = ();
//!     type Query = ();
//! }
//!
//! let post = client.call::<GetPost>().param("id", "12").json().await?;
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::http::{HttpMethod, IntoBody};
use crate::route;

pub trait Endpoint {
    const METHOD: HttpMethod;
    /// Route template, e.g. `/posts/:id`.
    const PATH: &'static str;

    type Success: DeserializeOwned;
    type Error: DeserializeOwned;
    /// Request body: `Json<T>` for structured payloads, `String` for raw
    /// text, `FormData` for multipart, `()` for routes without one.
    type Body: IntoBody;
    /// Query parameter shape; `()` for routes without one.
    type Query: Serialize;

    /// Names of the path parameters `PATH` requires.
    fn required_params() -> Vec<String> {
        route::required_params(Self::PATH)
    }
}
