use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::core::errors::BillSplitError;
use crate::core::models::{expense::Category, group::Group, user::UserProfile};

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Deserialize, IntoParams)]
pub struct SearchUsersQuery {
    /// Substring of a username or email.
    pub q: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct MemberRequest {
    pub member_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct GroupMessageResponse {
    pub message: String,
    pub group: Group,
}

#[derive(Deserialize, ToSchema)]
pub struct AddExpenseRequest {
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub group_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub struct ApiError(pub BillSplitError);

impl From<BillSplitError> for ApiError {
    fn from(err: BillSplitError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            BillSplitError::MissingEmail
            | BillSplitError::InvalidEmail(_)
            | BillSplitError::InvalidInput(..)
            | BillSplitError::InvalidOwnerCount(_)
            | BillSplitError::AlreadyGroupMember(_)
            | BillSplitError::CreatorCannotBeRemoved
            | BillSplitError::Settlement(_) => StatusCode::BAD_REQUEST,
            BillSplitError::InvalidCredentials | BillSplitError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            BillSplitError::NotGroupMember(_) | BillSplitError::NotGroupCreator(_) | BillSplitError::NotExpensePayer(..) => {
                StatusCode::FORBIDDEN
            }
            BillSplitError::UserNotFound(_) | BillSplitError::GroupNotFound(_) | BillSplitError::ExpenseNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            BillSplitError::EmailAlreadyRegistered(_)
            | BillSplitError::UsernameTaken(_)
            | BillSplitError::MemberHasExpenses(..) => StatusCode::CONFLICT,
            BillSplitError::InternalServerError(_) | BillSplitError::StorageError(_) | BillSplitError::LoggingError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self.0 {
            BillSplitError::InvalidInput(_, field) => field.description.clone(),
            other => other.to_string(),
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", message);
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
