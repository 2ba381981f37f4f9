use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware, response::IntoResponse, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::{
    error::HttpError,
    handler::{
        auth::auth_handler, inquiries::inquiry_handler, properties::property_handler,
        users::users_handler,
    },
    middleware::auth,
    AppState,
};

const MAX_REQUEST_SIZE: usize = 50 * 1024 * 1024;

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

async fn route_not_found() -> impl IntoResponse {
    HttpError::not_found("Route not found")
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let user_routes = auth_handler()
        .merge(users_handler().layer(middleware::from_fn(auth)));

    let api_route = Router::new()
        .nest("/users", user_routes)
        .nest("/properties", property_handler())
        .nest("/inquiries", inquiry_handler())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_SIZE));

    Router::new()
        .route("/api/healthchecker", get(health_check))
        .nest("/api/v1", api_route)
        .fallback(route_not_found)
}
