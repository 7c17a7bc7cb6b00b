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
        .route("/", post(create_donation))
        .route("/mine", get(list_mine))
}

pub async fn create_donation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallerContext>,
    body: Result<Json<dto::CreateDonationRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let donation = match body.into_new_donation() {
        Ok(d) => d,
        Err(res) => return res,
    };

    match services.ledger.create(ctx.caller(), donation).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Donation recorded",
                "donation": dto::donation_to_json(&record),
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
    match services.ledger.list_mine(ctx.caller()).await {
        Ok(items) => {
            let items = items.iter().map(dto::donation_to_json).collect::<Vec<_>>();
            Json(serde_json::json!({ "items": items })).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
