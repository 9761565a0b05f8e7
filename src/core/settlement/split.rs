use super::money::Money;

/// Decides how much of the group's spending each current member is charged.
///
/// Implementations must return exactly one share per member, in the same
/// order as `members`, and the shares must add up to `amount`.
pub trait SplitPolicy {
    fn shares(&self, amount: Money, members: &[String]) -> Vec<Money>;
}

/// Divides spending evenly across the whole membership.
///
/// Cents that do not divide evenly go one each to the first members in
/// snapshot order. Applied to a group total this leaves every member within a
/// cent of an exact split.
#[derive(Clone, Copy, Debug, Default)]
pub struct EqualSplit;

impl SplitPolicy for EqualSplit {
    fn shares(&self, amount: Money, members: &[String]) -> Vec<Money> {
        if members.is_empty() {
            return Vec::new();
        }
        let count = members.len() as i64;
        let base = amount.cents() / count;
        let leftover = amount.cents() % count;

        (0..count)
            .map(|i| Money::from_cents(base + i64::from(i < leftover)))
            .collect()
    }
}
