use crate::constants::{GROUP_CREATED, MEMBER_ADDED, MEMBER_REMOVED, USER_REGISTERED};
use crate::core::errors::BillSplitError;
use crate::core::models::expense::Category;
use crate::core::models::group::Role;
use crate::tests::{create_test_service, register};
use std::sync::Arc;

#[tokio::test]
async fn test_create_group_adds_creator_as_owner() {
    let service = create_test_service();
    let alice = register(&service, "alice").await;
    let bob = register(&service, "bob").await;

    let group = service
        .create_group("Trip".to_string(), vec![bob.id.clone(), bob.id.clone()], &alice.id)
        .await
        .unwrap();

    assert_eq!(group.name, "Trip");
    assert_eq!(group.creator_id, alice.id);
    assert_eq!(group.member_ids(), vec![alice.id.clone(), bob.id.clone()]);
    assert_eq!(group.members[0].role, Role::Owner);
    assert_eq!(group.members[1].role, Role::Member);

    let logs = service.get_app_logs().await.unwrap();
    assert_eq!(logs.last().unwrap().action, GROUP_CREATED);
}

#[tokio::test]
async fn test_create_group_with_unknown_member() {
    let service = create_test_service();
    let alice = register(&service, "alice").await;

    let result = service
        .create_group("Trip".to_string(), vec!["ghost".to_string()], &alice.id)
        .await;
    assert!(matches!(result, Err(BillSplitError::UserNotFound(ref id)) if id == "ghost"));

    let result = service.create_group("   ".to_string(), vec![], &alice.id).await;
    assert!(matches!(result, Err(BillSplitError::InvalidInput(..))));
}

#[tokio::test]
async fn test_get_group_requires_membership() {
    let service = create_test_service();
    let alice = register(&service, "alice").await;
    let mallory = register(&service, "mallory").await;
    let group = service.create_group("Flat".to_string(), vec![], &alice.id).await.unwrap();

    assert_eq!(service.get_group(&group.id, &alice.id).await.unwrap().id, group.id);
    assert!(matches!(
        service.get_group(&group.id, &mallory.id).await,
        Err(BillSplitError::NotGroupMember(_))
    ));
    assert!(matches!(
        service.get_group("missing", &alice.id).await,
        Err(BillSplitError::GroupNotFound(_))
    ));

    assert_eq!(service.get_my_groups(&alice.id).await.unwrap().len(), 1);
    assert!(service.get_my_groups(&mallory.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_and_remove_member() {
    let service = create_test_service();
    let alice = register(&service, "alice").await;
    let bob = register(&service, "bob").await;
    let group = service.create_group("Flat".to_string(), vec![], &alice.id).await.unwrap();

    let group = service.add_member(&group.id, &bob.id, &alice.id).await.unwrap();
    assert!(group.is_member(&bob.id));
    assert!(matches!(
        service.add_member(&group.id, &bob.id, &alice.id).await,
        Err(BillSplitError::AlreadyGroupMember(_))
    ));
    assert!(matches!(
        service.add_member(&group.id, "ghost", &alice.id).await,
        Err(BillSplitError::UserNotFound(_))
    ));

    let group = service.remove_member(&group.id, &bob.id, &alice.id).await.unwrap();
    assert!(!group.is_member(&bob.id));
    assert!(matches!(
        service.remove_member(&group.id, &bob.id, &alice.id).await,
        Err(BillSplitError::NotGroupMember(_))
    ));

    let actions: Vec<String> = service
        .get_app_logs()
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.action)
        .collect();
    assert!(actions.ends_with(&[MEMBER_ADDED.to_string(), MEMBER_REMOVED.to_string()]));
}

#[tokio::test]
async fn test_only_creator_manages_members() {
    let service = create_test_service();
    let alice = register(&service, "alice").await;
    let bob = register(&service, "bob").await;
    let carol = register(&service, "carol").await;
    let group = service
        .create_group("Flat".to_string(), vec![bob.id.clone()], &alice.id)
        .await
        .unwrap();

    assert!(matches!(
        service.add_member(&group.id, &carol.id, &bob.id).await,
        Err(BillSplitError::NotGroupCreator(_))
    ));
    assert!(matches!(
        service.remove_member(&group.id, &alice.id, &bob.id).await,
        Err(BillSplitError::NotGroupCreator(_))
    ));
    assert!(matches!(
        service.remove_member(&group.id, &alice.id, &alice.id).await,
        Err(BillSplitError::CreatorCannotBeRemoved)
    ));
    assert!(matches!(
        service.delete_group(&group.id, &bob.id).await,
        Err(BillSplitError::NotGroupCreator(_))
    ));
}

#[tokio::test]
async fn test_member_with_expenses_cannot_be_removed() {
    let service = create_test_service();
    let alice = register(&service, "alice").await;
    let bob = register(&service, "bob").await;
    let group = service
        .create_group("Flat".to_string(), vec![bob.id.clone()], &alice.id)
        .await
        .unwrap();
    let expense = service
        .add_expense(&group.id, "Groceries".to_string(), 30.0, Category::Food, &bob.id)
        .await
        .unwrap();

    assert!(matches!(
        service.remove_member(&group.id, &bob.id, &alice.id).await,
        Err(BillSplitError::MemberHasExpenses(_, 1))
    ));

    service.delete_expense(&expense.id, &bob.id).await.unwrap();
    service.remove_member(&group.id, &bob.id, &alice.id).await.unwrap();
}

#[tokio::test]
async fn test_delete_group_removes_expenses() {
    let service = create_test_service();
    let alice = register(&service, "alice").await;
    let group = service.create_group("Flat".to_string(), vec![], &alice.id).await.unwrap();
    let expense = service
        .add_expense(&group.id, "Rent".to_string(), 900.0, Category::Accommodation, &alice.id)
        .await
        .unwrap();

    service.delete_group(&group.id, &alice.id).await.unwrap();

    assert!(matches!(
        service.get_group(&group.id, &alice.id).await,
        Err(BillSplitError::GroupNotFound(_))
    ));
    assert!(matches!(
        service.delete_expense(&expense.id, &alice.id).await,
        Err(BillSplitError::ExpenseNotFound(_))
    ));
}

#[tokio::test]
async fn test_activity_is_scoped_to_group_and_caller() {
    let service = create_test_service();
    let alice = register(&service, "alice").await;
    let bob = register(&service, "bob").await;
    let carol = register(&service, "carol").await;
    let group = service
        .create_group("Flat".to_string(), vec![bob.id.clone()], &alice.id)
        .await
        .unwrap();
    service.add_member(&group.id, &carol.id, &alice.id).await.unwrap();
    service.remove_member(&group.id, &carol.id, &alice.id).await.unwrap();

    let group_actions: Vec<String> = service
        .get_group_activity(&group.id, &bob.id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.action)
        .collect();
    assert_eq!(group_actions, vec![GROUP_CREATED, MEMBER_ADDED, MEMBER_REMOVED]);

    assert!(matches!(
        service.get_group_activity(&group.id, &carol.id).await,
        Err(BillSplitError::NotGroupMember(_))
    ));

    let bob_actions = service.get_my_activity(&bob.id).await.unwrap();
    assert_eq!(bob_actions.len(), 1);
    assert_eq!(bob_actions[0].action, USER_REGISTERED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_add_member_keeps_every_member() {
    let service = Arc::new(create_test_service());
    let owner = register(&service, "owner").await;
    let mut joiners = Vec::new();
    for i in 0..8 {
        joiners.push(register(&service, &format!("joiner{i}")).await);
    }
    let group = service.create_group("Club".to_string(), vec![], &owner.id).await.unwrap();

    let handles: Vec<_> = joiners
        .iter()
        .map(|user| {
            let service = service.clone();
            let (group_id, user_id, owner_id) = (group.id.clone(), user.id.clone(), owner.id.clone());
            tokio::spawn(async move { service.add_member(&group_id, &user_id, &owner_id).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let group = service.get_group(&group.id, &owner.id).await.unwrap();
    assert_eq!(group.members.len(), 1 + joiners.len());
    assert!(joiners.iter().all(|u| group.is_member(&u.id)));
}
