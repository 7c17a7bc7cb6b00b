use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use fineease_core::{DomainError, ServiceError};

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_)
        | DomainError::DuplicateIdentity
        | DomainError::DuplicateRegistrationNumber
        | DomainError::InvalidAmount
        | DomainError::NgoNotApproved => StatusCode::BAD_REQUEST,
        DomainError::InvalidCredentials
        | DomainError::InvalidToken
        | DomainError::ExpiredToken
        | DomainError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden => StatusCode::FORBIDDEN,
        DomainError::NotFound => StatusCode::NOT_FOUND,
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = match &err {
        DomainError::Validation(msg) => msg.clone(),
        other => other.to_string(),
    };
    json_error(status_for(&err), err.code(), message)
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Infrastructure(e) => {
            tracing::error!(error = %e, "store failure");
            internal_error()
        }
        ServiceError::Internal(msg) => {
            tracing::error!(error = %msg, "internal failure");
            internal_error()
        }
    }
}

fn internal_error() -> axum::response::Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal server error",
    )
}

/// Malformed JSON bodies are caller errors, reported in the common error shape.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fineease_core::StoreError;

    #[test]
    fn domain_errors_map_to_caller_statuses() {
        assert_eq!(status_for(&DomainError::InvalidAmount), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&DomainError::NgoNotApproved), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&DomainError::ExpiredToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&DomainError::AuthenticationRequired), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&DomainError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_for(&DomainError::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_failures_are_opaque_500s() {
        let res = service_error_to_response(StoreError::unavailable("db down").into());
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_faults_are_500s_not_caller_errors() {
        let res = service_error_to_response(ServiceError::internal("session token could not be signed"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
