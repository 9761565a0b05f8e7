pub mod handlers;
pub mod models;
pub mod openapi;

use axum::{Router, routing::get};
use http::{Method, header};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::core::services::BillSplitService;
use crate::infrastructure::{logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage};

pub type AppService = BillSplitService<InMemoryLogging, InMemoryStorage>;

/// Full HTTP application: health check, `/api` routes, Swagger UI and middleware.
pub fn app(service: Arc<AppService>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(|| async { "Bill Split API is running!" }))
        .nest("/api", handlers::api_routes(service))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
}
