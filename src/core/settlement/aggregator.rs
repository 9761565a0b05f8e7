use log::debug;
use std::collections::{BTreeMap, HashSet};

use super::money::Money;
use super::split::{EqualSplit, SplitPolicy};
use super::{Balances, ExpenseRecord, SettlementError};

/// Folds a group's expenses into each member's net position using an equal split.
pub fn aggregate(members: &[String], expenses: &[ExpenseRecord]) -> Result<Balances, SettlementError> {
    aggregate_with(&EqualSplit, members, expenses)
}

/// Same as [`aggregate`] but with an explicit split policy.
///
/// Every member starts at zero and the payer of each expense is credited the
/// full amount. The policy then divides the group's total spend across the
/// membership once, so cents are rounded a single time and no member drifts
/// more than a cent from an exact split however many expenses there are. The
/// split always runs over the membership passed in, not the membership at the
/// time an expense was recorded.
pub fn aggregate_with<P: SplitPolicy + ?Sized>(
    policy: &P,
    members: &[String],
    expenses: &[ExpenseRecord],
) -> Result<Balances, SettlementError> {
    let members = dedup_members(members);
    if members.is_empty() {
        debug!("No members to aggregate, ignoring {} expenses", expenses.len());
        return Ok(Balances::new());
    }

    let mut balances: Balances = members.iter().map(|m| (m.clone(), Money::ZERO)).collect();
    let mut total = Money::ZERO;

    for expense in expenses {
        validate_expense(expense, &balances)?;
        if let Some(balance) = balances.get_mut(&expense.payer_id) {
            *balance += expense.amount;
        }
        total += expense.amount;
    }

    let shares = policy.shares(total, &members);
    if shares.len() != members.len() || shares.iter().copied().sum::<Money>() != total {
        return Err(SettlementError::SharesMismatch(total));
    }
    for (member, share) in members.iter().zip(shares) {
        if let Some(balance) = balances.get_mut(member) {
            *balance -= share;
        }
    }

    debug_assert!(balances.values().copied().sum::<Money>().is_zero());
    debug!("Aggregated {} over {} members: {:?}", total, balances.len(), balances);
    Ok(balances)
}

fn validate_expense(expense: &ExpenseRecord, balances: &BTreeMap<String, Money>) -> Result<(), SettlementError> {
    if expense.amount.is_negative() {
        return Err(SettlementError::NegativeAmount {
            expense_id: expense.id.clone(),
            amount: expense.amount,
        });
    }
    if !balances.contains_key(&expense.payer_id) {
        return Err(SettlementError::UnknownPayer {
            expense_id: expense.id.clone(),
            payer_id: expense.payer_id.clone(),
        });
    }
    Ok(())
}

// First occurrence wins so the captured order stays fixed.
fn dedup_members(members: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(members.len());
    members
        .iter()
        .filter(|m| seen.insert(m.as_str()))
        .cloned()
        .collect()
}
