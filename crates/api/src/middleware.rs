use std::time::Instant;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use tracing::{info, warn};

use fineease_auth::{Caller, CredentialVerifier};
use fineease_core::DomainError;

use crate::app::errors;
use crate::context::CallerContext;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: CredentialVerifier,
}

/// Resolve the request's caller from an optional bearer token.
///
/// No `Authorization` header means an anonymous caller; a header that does not
/// decode to a valid session is rejected here with 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let decoded = extract_bearer(req.headers()).and_then(|token| match token {
        None => Ok(Caller::Anonymous),
        Some(token) => state.verifier.decode(token).map(Caller::from),
    });
    let caller = match decoded {
        Ok(caller) => caller,
        Err(e) => {
            warn!(code = e.code(), "session rejected");
            return errors::domain_error_to_response(e);
        }
    };

    req.extensions_mut().insert(CallerContext::new(caller));
    next.run(req).await
}

/// One log line per request with its outcome and latency.
pub async fn trace_request(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let res = next.run(req).await;

    let status = res.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    if res.status().is_server_error() {
        warn!(%method, %path, status, latency_ms, "request failed");
    } else {
        info!(%method, %path, status, latency_ms, "request handled");
    }
    res
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, DomainError> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| DomainError::InvalidToken)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(DomainError::InvalidToken)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(DomainError::InvalidToken);
    }

    Ok(Some(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header::AUTHORIZATION};

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")), Ok(Some("abc.def")));
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_invalid() {
        assert_eq!(extract_bearer(&headers("Basic dXNlcg==")), Err(DomainError::InvalidToken));
        assert_eq!(extract_bearer(&headers("Bearer   ")), Err(DomainError::InvalidToken));
    }
}
