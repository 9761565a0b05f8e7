use log::debug;
use serde::Serialize;
use std::cmp::Reverse;
use utoipa::ToSchema;

use super::money::Money;
use super::{Balances, SETTLEMENT_TOLERANCE};

/// A single payment from a debtor to a creditor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct SettlementTransaction {
    pub from: String,
    pub to: String,
    #[schema(value_type = f64, example = 40.0)]
    pub amount: Money,
}

/// Output of [`plan`]: the raw balances plus the payments that clear them.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct SettlementPlan {
    #[schema(value_type = Object)]
    pub summary: Balances,
    pub transactions: Vec<SettlementTransaction>,
}

#[derive(Debug)]
struct Party {
    member: String,
    remaining: Money,
}

/// Greedily pairs the largest creditor with the largest debtor until one side runs out.
///
/// Only a zero balance counts as settled, one cent included. Balances sum to
/// zero, so both sides run out together and every balance ends at exactly
/// zero. Equal amounts are ordered by member id ascending. Produces at most
/// `creditors + debtors - 1` transactions.
pub fn plan(balances: &Balances) -> SettlementPlan {
    let (mut creditors, mut debtors) = split_parties(balances);
    debug!(
        "Planning settlement for {} creditors and {} debtors",
        creditors.len(),
        debtors.len()
    );

    let mut transactions = Vec::with_capacity((creditors.len() + debtors.len()).saturating_sub(1));
    let (mut c, mut d) = (0, 0);

    while c < creditors.len() && d < debtors.len() {
        let creditor = &mut creditors[c];
        let debtor = &mut debtors[d];
        let settled = creditor.remaining.min(debtor.remaining);

        transactions.push(SettlementTransaction {
            from: debtor.member.clone(),
            to: creditor.member.clone(),
            amount: settled,
        });

        creditor.remaining -= settled;
        debtor.remaining -= settled;

        if creditor.remaining < SETTLEMENT_TOLERANCE {
            c += 1;
        }
        if debtor.remaining < SETTLEMENT_TOLERANCE {
            d += 1;
        }
    }

    debug!("Planned {} settlement transactions", transactions.len());
    SettlementPlan {
        summary: balances.clone(),
        transactions,
    }
}

fn split_parties(balances: &Balances) -> (Vec<Party>, Vec<Party>) {
    let mut creditors = Vec::new();
    let mut debtors = Vec::new();

    for (member, &balance) in balances {
        if balance >= SETTLEMENT_TOLERANCE {
            creditors.push(Party {
                member: member.clone(),
                remaining: balance,
            });
        } else if balance <= -SETTLEMENT_TOLERANCE {
            debtors.push(Party {
                member: member.clone(),
                remaining: balance.abs(),
            });
        }
    }

    // BTreeMap iteration is already id-ascending, so a stable sort keeps that as the tie-break.
    creditors.sort_by_key(|p| Reverse(p.remaining));
    debtors.sort_by_key(|p| Reverse(p.remaining));
    (creditors, debtors)
}
