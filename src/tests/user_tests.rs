use crate::constants::{USER_LOGGED_IN, USER_REGISTERED};
use crate::core::errors::BillSplitError;
use crate::tests::{create_test_service, register};

#[tokio::test]
async fn test_register_and_login() {
    let service = create_test_service();
    let (user, token) = service
        .register(
            "alice".to_string(),
            "Alice@Example.com".to_string(),
            "password123".to_string(),
        )
        .await
        .unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(service.validate_token(&token).unwrap().sub, user.id);

    let (logged_in, token) = service.authenticate("alice@example.com", "password123").await.unwrap();
    assert_eq!(logged_in, user);
    assert_eq!(service.validate_token(&token).unwrap().sub, user.id);

    let logs = service.get_app_logs().await.unwrap();
    let actions: Vec<&str> = logs.iter().map(|l| l.action.as_str()).collect();
    assert_eq!(actions, vec![USER_REGISTERED, USER_LOGGED_IN]);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let service = create_test_service();
    register(&service, "bob").await;

    let result = service.authenticate("bob@example.com", "not-the-password").await;
    assert!(matches!(result, Err(BillSplitError::InvalidCredentials)));

    let result = service.authenticate("nobody@example.com", "password123").await;
    assert!(matches!(result, Err(BillSplitError::InvalidCredentials)));
}

#[tokio::test]
async fn test_register_duplicate_email_and_username() {
    let service = create_test_service();
    register(&service, "carol").await;

    let result = service
        .register(
            "carol2".to_string(),
            "carol@example.com".to_string(),
            "password123".to_string(),
        )
        .await;
    assert!(matches!(result, Err(BillSplitError::EmailAlreadyRegistered(_))));

    let result = service
        .register(
            "Carol".to_string(),
            "other@example.com".to_string(),
            "password123".to_string(),
        )
        .await;
    assert!(matches!(result, Err(BillSplitError::UsernameTaken(_))));
}

#[tokio::test]
async fn test_register_validation() {
    let service = create_test_service();

    let result = service
        .register("dave".to_string(), "".to_string(), "password123".to_string())
        .await;
    assert!(matches!(result, Err(BillSplitError::MissingEmail)));

    let result = service
        .register("dave".to_string(), "invalid".to_string(), "password123".to_string())
        .await;
    assert!(matches!(result, Err(BillSplitError::InvalidEmail(_))));

    let result = service
        .register("dave".to_string(), "dave@example.com".to_string(), "short".to_string())
        .await;
    assert!(matches!(result, Err(BillSplitError::InvalidInput(ref field, _)) if field == "password"));

    let result = service
        .register("  ".to_string(), "dave@example.com".to_string(), "password123".to_string())
        .await;
    assert!(matches!(result, Err(BillSplitError::InvalidInput(ref field, _)) if field == "username"));
}

#[tokio::test]
async fn test_search_users_excludes_caller() {
    let service = create_test_service();
    let erin = register(&service, "erin").await;
    let erik = register(&service, "erik").await;
    register(&service, "frank").await;

    let found = service.search_users("ER", &erin.id).await.unwrap();
    assert_eq!(found, vec![erik]);

    let result = service.search_users("   ", &erin.id).await;
    assert!(matches!(result, Err(BillSplitError::InvalidInput(..))));
}
