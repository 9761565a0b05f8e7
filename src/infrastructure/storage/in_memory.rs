use crate::core::errors::BillSplitError;
use crate::core::models::{
    expense::Expense,
    group::{Group, GroupMember},
    user::User,
};
use crate::infrastructure::storage::{BillSnapshot, Storage};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<String, User>>>,
    user_ids_by_email: Arc<RwLock<HashMap<String, String>>>,
    groups: Arc<RwLock<HashMap<String, Group>>>,
    expenses: Arc<RwLock<HashMap<String, Expense>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn expenses_for(expenses: &HashMap<String, Expense>, group_id: &str) -> Vec<Expense> {
    let mut found: Vec<Expense> = expenses.values().filter(|e| e.group_id == group_id).cloned().collect();
    found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    found
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_user(&self, user: User) -> Result<User, BillSplitError> {
        let mut users = self.users.write().await;
        let mut user_ids_by_email = self.user_ids_by_email.write().await;
        if user_ids_by_email.contains_key(&user.email) {
            return Err(BillSplitError::EmailAlreadyRegistered(user.email));
        }
        if users.values().any(|u| u.username.eq_ignore_ascii_case(&user.username)) {
            return Err(BillSplitError::UsernameTaken(user.username));
        }
        user_ids_by_email.insert(user.email.clone(), user.id.clone());
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, BillSplitError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, BillSplitError> {
        let users = self.users.read().await;
        let user_ids_by_email = self.user_ids_by_email.read().await;
        Ok(user_ids_by_email.get(email).and_then(|id| users.get(id).cloned()))
    }

    async fn list_users(&self) -> Result<Vec<User>, BillSplitError> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }

    async fn save_group(&self, group: Group) -> Result<(), BillSplitError> {
        let mut groups = self.groups.write().await;
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, BillSplitError> {
        let groups = self.groups.read().await;
        Ok(groups.get(group_id).cloned())
    }

    async fn get_user_groups(&self, user_id: &str) -> Result<Vec<Group>, BillSplitError> {
        let groups = self.groups.read().await;
        let mut found: Vec<Group> = groups.values().filter(|g| g.is_member(user_id)).cloned().collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn delete_group(&self, group_id: &str) -> Result<(), BillSplitError> {
        let mut groups = self.groups.write().await;
        let mut expenses = self.expenses.write().await;
        groups.remove(group_id);
        expenses.retain(|_, e| e.group_id != group_id);
        Ok(())
    }

    async fn add_group_member(&self, group_id: &str, member: GroupMember) -> Result<Group, BillSplitError> {
        let mut groups = self.groups.write().await;
        let group = groups
            .get_mut(group_id)
            .ok_or_else(|| BillSplitError::GroupNotFound(group_id.to_string()))?;
        if group.is_member(&member.user.id) {
            return Err(BillSplitError::AlreadyGroupMember(member.user.id));
        }
        group.members.push(member);
        group.updated_at = Utc::now();
        Ok(group.clone())
    }

    async fn remove_group_member(&self, group_id: &str, member_id: &str) -> Result<Group, BillSplitError> {
        // Lock order matches delete_group: groups, then expenses.
        let mut groups = self.groups.write().await;
        let expenses = self.expenses.read().await;
        let group = groups
            .get_mut(group_id)
            .ok_or_else(|| BillSplitError::GroupNotFound(group_id.to_string()))?;
        if !group.is_member(member_id) {
            return Err(BillSplitError::NotGroupMember(member_id.to_string()));
        }
        if group.is_creator(member_id) {
            return Err(BillSplitError::CreatorCannotBeRemoved);
        }
        let paid = expenses
            .values()
            .filter(|e| e.group_id == group_id && e.payer.id == member_id)
            .count();
        if paid > 0 {
            return Err(BillSplitError::MemberHasExpenses(member_id.to_string(), paid));
        }
        group.members.retain(|m| m.user.id != member_id);
        group.updated_at = Utc::now();
        Ok(group.clone())
    }

    async fn save_expense(&self, expense: Expense) -> Result<(), BillSplitError> {
        let groups = self.groups.read().await;
        let mut expenses = self.expenses.write().await;
        let group = groups
            .get(&expense.group_id)
            .ok_or_else(|| BillSplitError::GroupNotFound(expense.group_id.clone()))?;
        if !group.is_member(&expense.payer.id) {
            return Err(BillSplitError::NotGroupMember(expense.payer.id));
        }
        expenses.insert(expense.id.clone(), expense);
        Ok(())
    }

    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, BillSplitError> {
        let expenses = self.expenses.read().await;
        Ok(expenses.get(expense_id).cloned())
    }

    async fn get_group_expenses(&self, group_id: &str) -> Result<Vec<Expense>, BillSplitError> {
        let expenses = self.expenses.read().await;
        Ok(expenses_for(&expenses, group_id))
    }

    async fn delete_expense(&self, expense_id: &str) -> Result<(), BillSplitError> {
        let mut expenses = self.expenses.write().await;
        expenses
            .remove(expense_id)
            .map(|_| ())
            .ok_or_else(|| BillSplitError::ExpenseNotFound(expense_id.to_string()))
    }

    async fn load_bill_snapshot(&self, group_id: &str) -> Result<Option<BillSnapshot>, BillSplitError> {
        // Both guards are held together, in the same order as delete_group.
        let groups = self.groups.read().await;
        let expenses = self.expenses.read().await;
        Ok(groups.get(group_id).map(|group| BillSnapshot {
            group: group.clone(),
            expenses: expenses_for(&expenses, group_id),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{expense::Category, group::Role, user::UserProfile};
    use crate::core::settlement::Money;

    fn profile(id: &str) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            username: id.to_string(),
            email: format!("{}@example.com", id),
        }
    }

    fn member(id: &str, role: Role) -> GroupMember {
        GroupMember { user: profile(id), role }
    }

    fn expense(id: &str, group_id: &str, payer: &str) -> Expense {
        let now = Utc::now();
        Expense {
            id: id.to_string(),
            description: "Snacks".to_string(),
            amount: Money::from_cents(1200),
            category: Category::Food,
            payer: profile(payer),
            group_id: group_id.to_string(),
            split_details: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    async fn storage_with_group() -> InMemoryStorage {
        let storage = InMemoryStorage::new();
        let now = Utc::now();
        storage
            .save_group(Group {
                id: "g1".to_string(),
                name: "Flat".to_string(),
                creator_id: "owner".to_string(),
                members: vec![member("owner", Role::Owner), member("m1", Role::Member)],
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn payer_with_expenses_cannot_be_removed() {
        let storage = storage_with_group().await;
        storage.save_expense(expense("e1", "g1", "m1")).await.unwrap();

        assert!(matches!(
            storage.remove_group_member("g1", "m1").await,
            Err(BillSplitError::MemberHasExpenses(ref id, 1)) if id == "m1"
        ));
        assert!(storage.get_group("g1").await.unwrap().unwrap().is_member("m1"));
    }

    #[tokio::test]
    async fn removed_member_cannot_record_expenses() {
        let storage = storage_with_group().await;
        let group = storage.remove_group_member("g1", "m1").await.unwrap();
        assert!(!group.is_member("m1"));

        assert!(matches!(
            storage.save_expense(expense("e1", "g1", "m1")).await,
            Err(BillSplitError::NotGroupMember(ref id)) if id == "m1"
        ));
        assert!(storage.get_group_expenses("g1").await.unwrap().is_empty());
        assert!(matches!(
            storage.save_expense(expense("e2", "gone", "owner")).await,
            Err(BillSplitError::GroupNotFound(_))
        ));
    }

    #[tokio::test]
    async fn creator_stays_in_group() {
        let storage = storage_with_group().await;
        assert!(matches!(
            storage.remove_group_member("g1", "owner").await,
            Err(BillSplitError::CreatorCannotBeRemoved)
        ));
    }

    #[tokio::test]
    async fn adding_twice_is_rejected() {
        let storage = storage_with_group().await;
        let group = storage.add_group_member("g1", member("m2", Role::Member)).await.unwrap();
        assert_eq!(group.member_ids(), vec!["owner", "m1", "m2"]);
        assert!(matches!(
            storage.add_group_member("g1", member("m2", Role::Member)).await,
            Err(BillSplitError::AlreadyGroupMember(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_removal_and_expense_never_orphan_a_payer() {
        for round in 0..50 {
            let storage = storage_with_group().await;
            let remover = storage.clone();
            let spender = storage.clone();
            let (removed, saved) = tokio::join!(
                tokio::spawn(async move { remover.remove_group_member("g1", "m1").await }),
                tokio::spawn(async move { spender.save_expense(expense(&format!("e{round}"), "g1", "m1")).await }),
            );
            let (removed, saved) = (removed.unwrap(), saved.unwrap());
            assert!(removed.is_ok() != saved.is_ok(), "exactly one side wins");

            let snapshot = storage.load_bill_snapshot("g1").await.unwrap().unwrap();
            assert!(snapshot.expenses.iter().all(|e| snapshot.group.is_member(&e.payer.id)));
        }
    }
}
