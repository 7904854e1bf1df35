use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use zombie_core::{Amount, IdentityKey, Month};

/// A reported recurring charge: the group's canonical identity plus every
/// distinct month it was seen in, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurringCharge {
    pub description: String,
    pub amount: Amount,
    pub months: Vec<Month>,
}

impl RecurringCharge {
    pub fn key(&self) -> IdentityKey {
        IdentityKey::new(&self.description, self.amount)
    }
}

impl std::fmt::Display for RecurringCharge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ${} ({} months)", self.description, self.amount, self.months.len())
    }
}

/// Month sets per identity group, kept in key creation order.
#[derive(Debug, Default)]
pub struct Aggregator {
    groups: Vec<(IdentityKey, BTreeSet<Month>)>,
    index: HashMap<IdentityKey, usize>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: IdentityKey, month: Month) {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.groups.push((key.clone(), BTreeSet::new()));
                self.index.insert(key, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[slot].1.insert(month);
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn months_for(&self, key: &IdentityKey) -> Option<&BTreeSet<Month>> {
        self.index.get(key).map(|&slot| &self.groups[slot].1)
    }

    /// Groups seen in at least `threshold` distinct months.
    pub fn recurring(&self, threshold: u32) -> Vec<RecurringCharge> {
        self.groups
            .iter()
            .filter(|(_, months)| months.len() >= threshold as usize)
            .map(|(key, months)| RecurringCharge {
                description: key.description.clone(),
                amount: key.amount,
                months: months.iter().copied().collect(),
            })
            .collect()
    }
}
