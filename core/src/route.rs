//! Route templates with `:name` parameters.
//!
//! # Design
//! A template such as `/posts/:id/comments` is a plain string. `resolve`
//! substitutes each `:name` token with the percent-encoded value from a
//! `PathParams` mapping and fails fast on the first missing name, before any
//! request is built. `required_params` reports the names a template needs
//! using the same token grammar, so the two never disagree.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::error::FetchError;

/// Path parameter values keyed by name. Inserting a name twice keeps the last value.
pub type PathParams = BTreeMap<String, String>;

/// Characters left unescaped by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

lazy_static! {
    static ref PARAM_TOKEN: Regex =
        Regex::new(r":([A-Za-z0-9_]+)").expect("parameter token pattern is valid");
}

/// Substitute every `:name` token in `template` with the encoded value of
/// `params[name]`.
///
/// Extra entries in `params` are ignored. A template without tokens is
/// returned unchanged.
pub fn resolve(template: &str, params: &PathParams) -> Result<String, FetchError> {
    if !template.contains(':') {
        return Ok(template.to_string());
    }

    let mut resolved = String::with_capacity(template.len());
    let mut last = 0;
    for captures in PARAM_TOKEN.captures_iter(template) {
        let (Some(token), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let value = params
            .get(name.as_str())
            .ok_or_else(|| FetchError::MissingParameter {
                name: name.as_str().to_string(),
            })?;
        resolved.push_str(&template[last..token.start()]);
        resolved.push_str(&encode_component(value));
        last = token.end();
    }
    resolved.push_str(&template[last..]);
    Ok(resolved)
}

/// Parameter names `template` requires, unique, in order of first occurrence.
pub fn required_params(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for captures in PARAM_TOKEN.captures_iter(template) {
        if let Some(name) = captures.get(1) {
            if !names.iter().any(|known| known == name.as_str()) {
                names.push(name.as_str().to_string());
            }
        }
    }
    names
}

/// Percent-encode a single path component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}
