use billsplit::api;
use billsplit::auth::jwt::JwtService;
use billsplit::config::CONFIG;
use billsplit::core::services::BillSplitService;
use billsplit::infrastructure::{logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&CONFIG.log_level)))
        .init();
    info!("Starting with {:?}", *CONFIG);

    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    let jwt = JwtService::new(CONFIG.jwt_secret.clone(), CONFIG.jwt_ttl_secs);
    let service = Arc::new(BillSplitService::new(storage, logging, jwt, CONFIG.bcrypt_cost));

    let app = api::app(service, Duration::from_secs(CONFIG.request_timeout_secs));

    let addr = SocketAddr::from((CONFIG.host, CONFIG.port));
    info!("Server running at http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
