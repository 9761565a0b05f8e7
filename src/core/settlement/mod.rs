//! Balance aggregation and debt settlement.
//!
//! Everything in here is a pure function of an immutable snapshot: a group's
//! membership and its expenses go in, per-member balances and a list of
//! settlement payments come out. No I/O, no shared state.

pub mod aggregator;
pub mod money;
pub mod planner;
pub mod split;

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use utoipa::ToSchema;

pub use aggregator::{aggregate, aggregate_with};
pub use money::Money;
pub use planner::{SettlementPlan, SettlementTransaction, plan};
pub use split::{EqualSplit, SplitPolicy};

/// Smallest amount the planner will move. Balances are whole cents, so a
/// balance below this is exactly zero and settled.
pub const SETTLEMENT_TOLERANCE: Money = Money::from_cents(1);

pub const NO_MEMBERS_MESSAGE: &str = "No members in this group to split bill.";

/// Net position per member id. Positive means the member is owed money.
pub type Balances = BTreeMap<String, Money>;

/// The slice of an expense the settlement computation consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseRecord {
    pub id: String,
    pub payer_id: String,
    pub amount: Money,
    pub group_id: String,
}

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum SettlementError {
    #[error("Expense {expense_id} has negative amount {amount}")]
    NegativeAmount { expense_id: String, amount: Money },

    #[error("Expense {expense_id} was paid by {payer_id}, who is not a group member")]
    UnknownPayer { expense_id: String, payer_id: String },

    #[error("Split shares do not add up to the group total {0}")]
    SharesMismatch(Money),

    #[error("Amount {0} is not a finite number")]
    NonFiniteAmount(f64),

    #[error("Amount {0} is out of range")]
    AmountOutOfRange(f64),
}

/// What a bill-split request returns.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SettlementReport {
    Settled(SettlementPlan),
    NoMembers {
        message: String,
        transactions: Vec<SettlementTransaction>,
    },
}

impl SettlementReport {
    pub fn no_members() -> Self {
        SettlementReport::NoMembers {
            message: NO_MEMBERS_MESSAGE.to_string(),
            transactions: Vec::new(),
        }
    }

    pub fn transactions(&self) -> &[SettlementTransaction] {
        match self {
            SettlementReport::Settled(plan) => &plan.transactions,
            SettlementReport::NoMembers { transactions, .. } => transactions,
        }
    }
}

/// Aggregates the snapshot and plans its settlement in one call.
pub fn compute_settlement(members: &[String], expenses: &[ExpenseRecord]) -> Result<SettlementReport, SettlementError> {
    if members.is_empty() {
        return Ok(SettlementReport::no_members());
    }
    let balances = aggregate(members, expenses)?;
    Ok(SettlementReport::Settled(plan(&balances)))
}
