use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_approved))
        .route("/add", post(create_ngo))
        .route("/mine", get(list_mine))
        .route("/approved", get(list_approved))
}

pub async fn create_ngo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    body: Result<Json<dto::CreateNgoRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    match services.registry.create(ctx.caller(), body.into()).await {
        Ok(ngo) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "NGO submitted for review",
                "ngo": dto::ngo_to_json(&ngo),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_mine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
) -> axum::response::Response {
    match services.registry.list_mine(ctx.caller()).await {
        Ok(items) => Json(dto::ngos_to_json(&items)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Public: no caller check beyond the middleware.
pub async fn list_approved(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.registry.list_approved().await {
        Ok(items) => Json(dto::ngos_to_json(&items)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
