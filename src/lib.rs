pub mod api;
pub mod auth;
pub mod config;
pub mod constants;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::BillSplitError;
pub use crate::core::services::BillSplitService;
pub use crate::core::settlement::{
    Balances, ExpenseRecord, Money, SettlementError, SettlementPlan, SettlementReport, SettlementTransaction,
    aggregate, compute_settlement, plan,
};

#[cfg(test)]
mod tests;
