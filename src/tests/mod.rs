mod group_tests;
mod user_tests;

use crate::api::AppService;
use crate::auth::jwt::JwtService;
use crate::core::models::user::UserProfile;
use crate::core::services::BillSplitService;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryStorage;

pub const TEST_JWT_SECRET: &str = "test-secret";

pub fn create_test_service() -> AppService {
    let _ = env_logger::try_init();
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    BillSplitService::new(
        storage,
        logging,
        JwtService::new(TEST_JWT_SECRET.to_string(), 3600),
        4,
    )
}

pub async fn register(service: &AppService, username: &str) -> UserProfile {
    let (user, _token) = service
        .register(
            username.to_string(),
            format!("{}@example.com", username),
            "password123".to_string(),
        )
        .await
        .unwrap();
    user
}
