//! Admin-only moderation endpoints, plus the shared statistics read.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use fineease_core::{NgoId, ServiceResult};
use fineease_registry::NgoRecord;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/ngos", get(list_ngos))
        .route("/ngos/:id", get(get_ngo))
        .route("/ngos/approve/:id", put(approve_ngo))
        .route("/ngos/reject/:id", put(reject_ngo))
        .route("/statistics", get(statistics))
}

pub async fn approve_ngo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_ngo_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    moderation_response(services.registry.approve(ctx.caller(), id).await, "NGO approved")
}

pub async fn reject_ngo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_ngo_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    moderation_response(services.registry.reject(ctx.caller(), id).await, "NGO rejected")
}

fn moderation_response(result: ServiceResult<NgoRecord>, message: &str) -> axum::response::Response {
    match result {
        Ok(ngo) => Json(serde_json::json!({
            "message": message,
            "ngo": dto::ngo_to_json(&ngo),
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_ngos(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
) -> axum::response::Response {
    match services.registry.list_all(ctx.caller()).await {
        Ok(items) => Json(dto::ngos_to_json(&items)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_ngo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: NgoId = match dto::parse_ngo_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.registry.get_by_id(ctx.caller(), id).await {
        Ok(ngo) => Json(dto::ngo_to_json(&ngo)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn statistics(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
) -> axum::response::Response {
    match services.statistics(ctx.caller()).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
