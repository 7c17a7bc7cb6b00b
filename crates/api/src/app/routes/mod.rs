use axum::Router;

pub mod admin;
pub mod auth;
pub mod donations;
pub mod ngos;
pub mod system;

/// Router for everything under `/api`. Every handler receives a caller context.
pub fn router() -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/ngo", ngos::router())
        .nest("/donation", donations::router())
        .nest("/admin", admin::router())
}
