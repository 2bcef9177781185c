use std::collections::HashMap;

use axum::extract::Query;
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, Method, Uri};

use permkit_core::ResolveError;

/// Per-request context permissions are evaluated against.
///
/// Owns the request head for the duration of the check; the middleware hands
/// the parts back to the request once a decision has been made.
#[derive(Debug)]
pub struct RequestContext {
    parts: Parts,
    path_params: HashMap<String, String>,
    query: Option<HashMap<String, String>>,
}

impl RequestContext {
    pub fn new<'a>(parts: Parts, path_params: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .ok()
            .map(|Query(query)| query);

        Self {
            parts,
            path_params: path_params
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
            query,
        }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    /// Header value as text. Absent headers are `Ok(None)`.
    pub fn header(&self, name: &str) -> Result<Option<&str>, ResolveError> {
        match self.parts.headers.get(name) {
            None => Ok(None),
            Some(value) => value
                .to_str()
                .map(Some)
                .map_err(|_| ResolveError::validation(format!("header '{name}' is not valid text"))),
        }
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Query parameter. A query string that cannot be decoded is a validation error.
    pub fn query_param(&self, name: &str) -> Result<Option<&str>, ResolveError> {
        match &self.query {
            Some(query) => Ok(query.get(name).map(String::as_str)),
            None => Err(ResolveError::validation("malformed query string")),
        }
    }

    pub fn into_parts(self) -> Parts {
        self.parts
    }
}
