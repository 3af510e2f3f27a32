//! Namespace extraction.
//!
//! A caller presents an access token either as `Authorization: Bearer ...`
//! or as the `access_token` query parameter. The token is looked up in the
//! configured table and its namespace is prefixed onto every kind, so two
//! callers writing the same kind never see each other's records.

use axum::{
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::AppState;

/// Separator between a namespace and the caller's kind.
pub const NAMESPACE_SEPARATOR: &str = "--";

/// The namespace a request operates in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace(Option<String>);

impl Namespace {
    /// No prefix; used when the server runs without tokens.
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn named(namespace: impl Into<String>) -> Self {
        Self(Some(namespace.into()))
    }

    /// The store kind for the caller's `kind`.
    pub fn qualify(&self, kind: &str) -> String {
        match &self.0 {
            Some(namespace) => format!("{namespace}{NAMESPACE_SEPARATOR}{kind}"),
            None => kind.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct TokenParam {
    access_token: Option<String>,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn query_token(parts: &Parts) -> Option<String> {
    let Query(param) = Query::<TokenParam>::try_from_uri(&parts.uri).ok()?;
    param.access_token.filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for Namespace {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.config.requires_auth() {
            return Ok(Namespace::anonymous());
        }

        let token = bearer_token(parts)
            .or_else(|| query_token(parts))
            .ok_or(AppError::Unauthorized)?;

        match state.config.tokens.get(&token) {
            Some(namespace) => Ok(Namespace::named(namespace.clone())),
            None => {
                tracing::debug!("Rejected unknown access token");
                Err(AppError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn request_parts(uri: &str, authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn qualify_prefixes_namespace() {
        assert_eq!(Namespace::anonymous().qualify("notes"), "notes");
        assert_eq!(Namespace::named("alice").qualify("notes"), "alice--notes");
    }

    #[test]
    fn reads_bearer_header() {
        let parts = request_parts("/objects/k", Some("Bearer abc"));
        assert_eq!(bearer_token(&parts), Some("abc".to_string()));

        let parts = request_parts("/objects/k", Some("abc"));
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn reads_query_parameter() {
        let parts = request_parts("/objects/k?where=a%3Db&access_token=xyz", None);
        assert_eq!(query_token(&parts), Some("xyz".to_string()));

        let parts = request_parts("/objects/k?access_token=", None);
        assert_eq!(query_token(&parts), None);

        let parts = request_parts("/objects/k", None);
        assert_eq!(query_token(&parts), None);
    }
}
