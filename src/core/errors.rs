use serde::Serialize;
use thiserror::Error;

use super::settlement::SettlementError;

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

#[derive(Error, Debug, Serialize)]
pub enum BillSplitError {
    #[error("Email is required")]
    MissingEmail,
    #[error("Email {0} already registered")]
    EmailAlreadyRegistered(String),
    #[error("Username {0} is already taken")]
    UsernameTaken(String),
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("Group {0} not found")]
    GroupNotFound(String),
    #[error("Expense {0} not found")]
    ExpenseNotFound(String),
    #[error("User {0} is already a group member")]
    AlreadyGroupMember(String),
    #[error("User {0} is not a group member")]
    NotGroupMember(String),
    #[error("User {0} is not the group creator")]
    NotGroupCreator(String),
    #[error("Group creator cannot be removed from the group")]
    CreatorCannotBeRemoved,
    #[error("User {0} paid for {1} expenses in this group and cannot be removed")]
    MemberHasExpenses(String, usize),
    #[error("Invalid owner count: {0}")]
    InvalidOwnerCount(usize),
    #[error("User {0} did not pay expense {1}")]
    NotExpensePayer(String, String),
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Cannot split bill: {0}")]
    Settlement(#[from] SettlementError),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
}

impl BillSplitError {
    pub fn invalid_input(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        BillSplitError::InvalidInput(
            field.to_string(),
            FieldError {
                field: field.to_string(),
                title: title.into(),
                description: description.into(),
            },
        )
    }
}
