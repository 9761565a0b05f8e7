use super::user::UserProfile;
use crate::core::settlement::{ExpenseRecord, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum Category {
    Food,
    Travel,
    Accommodation,
    Shopping,
    Others,
}

/// Per-member share recorded with an expense. Bill splitting ignores it and
/// always divides evenly.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SplitDetail {
    pub user_id: String,
    #[schema(value_type = f64)]
    pub share: Money,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Expense {
    pub id: String,
    pub description: String,
    #[schema(value_type = f64, example = 42.5)]
    pub amount: Money,
    pub category: Category,
    pub payer: UserProfile,
    pub group_id: String,
    #[serde(default)]
    pub split_details: Vec<SplitDetail>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    pub fn record(&self) -> ExpenseRecord {
        ExpenseRecord {
            id: self.id.clone(),
            payer_id: self.payer.id.clone(),
            amount: self.amount,
            group_id: self.group_id.clone(),
        }
    }
}
