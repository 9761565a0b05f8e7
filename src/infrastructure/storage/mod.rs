use crate::core::errors::BillSplitError;
use crate::core::models::{
    expense::Expense,
    group::{Group, GroupMember},
    user::User,
};
use async_trait::async_trait;

/// A group together with its expenses, read as one consistent view.
#[derive(Clone, Debug)]
pub struct BillSnapshot {
    pub group: Group,
    pub expenses: Vec<Expense>,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Fails with `EmailAlreadyRegistered` or `UsernameTaken` when either is already in use.
    async fn create_user(&self, user: User) -> Result<User, BillSplitError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, BillSplitError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, BillSplitError>;
    async fn list_users(&self) -> Result<Vec<User>, BillSplitError>;

    async fn save_group(&self, group: Group) -> Result<(), BillSplitError>;
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, BillSplitError>;
    async fn get_user_groups(&self, user_id: &str) -> Result<Vec<Group>, BillSplitError>;
    /// Removes the group and every expense recorded against it.
    async fn delete_group(&self, group_id: &str) -> Result<(), BillSplitError>;
    /// Appends a member, failing with `AlreadyGroupMember` if they joined meanwhile.
    async fn add_group_member(&self, group_id: &str, member: GroupMember) -> Result<Group, BillSplitError>;
    /// Removes a member unless they are the creator or paid for any of the
    /// group's expenses. The expense check and the removal happen atomically.
    async fn remove_group_member(&self, group_id: &str, member_id: &str) -> Result<Group, BillSplitError>;

    /// Fails with `NotGroupMember` if the payer is no longer in the group.
    async fn save_expense(&self, expense: Expense) -> Result<(), BillSplitError>;
    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, BillSplitError>;
    async fn get_group_expenses(&self, group_id: &str) -> Result<Vec<Expense>, BillSplitError>;
    async fn delete_expense(&self, expense_id: &str) -> Result<(), BillSplitError>;

    async fn load_bill_snapshot(&self, group_id: &str) -> Result<Option<BillSnapshot>, BillSplitError>;
}

pub mod in_memory;
