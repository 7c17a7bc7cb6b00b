use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use fineease_auth::{Action, Registration, Role, authorize};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(whoami))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    let registration = Registration {
        identity: body.email,
        secret: body.password,
        role: body.role.unwrap_or(Role::Donor),
        name: body.name,
    };

    match services.verifier.register(registration).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "User registered successfully",
                "user": dto::user_to_json(&user),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    match services.verifier.authenticate(&body.email, &body.password).await {
        Ok(session) => (StatusCode::OK, Json(dto::session_to_json(&session))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn whoami(Extension(ctx): Extension<CallerContext>) -> axum::response::Response {
    if let Err(e) = authorize(ctx.caller(), Action::WhoAmI) {
        return errors::domain_error_to_response(e);
    }
    let Some(principal) = ctx.caller().principal() else {
        return errors::domain_error_to_response(fineease_core::DomainError::AuthenticationRequired);
    };

    Json(serde_json::json!({
        "id": principal.user_id.to_string(),
        "email": principal.identity.as_str(),
        "role": principal.role.as_str(),
    }))
    .into_response()
}
