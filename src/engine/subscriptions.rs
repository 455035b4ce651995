// subscriptions.rs
// Tick-update subscriptions keyed by pool and pair. A fresh set is built for
// every pair selection and diffed against the previous one.

use std::collections::BTreeSet;

use crate::engine::router::candidate_pools;
use crate::models::{Pool, TokenId};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionKey {
    pub pool_index: usize,
    /// Pair with the smaller token id first.
    pub pair: (TokenId, TokenId),
}

impl SubscriptionKey {
    pub fn new(pool_index: usize, a: &TokenId, b: &TokenId) -> Self {
        let pair = if a <= b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
        Self { pool_index, pair }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubscriptionDiff {
    pub added: Vec<SubscriptionKey>,
    pub removed: Vec<SubscriptionKey>,
}

impl SubscriptionDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubscriptionSet {
    keys: BTreeSet<SubscriptionKey>,
}

impl SubscriptionSet {
    /// One key per pool quoting `from`/`to`.
    pub fn for_pair(pools: &[Pool], from: &TokenId, to: &TokenId) -> Self {
        let keys = candidate_pools(pools, from, to)
            .into_iter()
            .map(|i| SubscriptionKey::new(i, from, to))
            .collect();
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &SubscriptionKey) -> bool {
        self.keys.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubscriptionKey> {
        self.keys.iter()
    }

    /// Keys to subscribe and unsubscribe when moving from `self` to `next`.
    pub fn diff(&self, next: &SubscriptionSet) -> SubscriptionDiff {
        SubscriptionDiff {
            added: next.keys.difference(&self.keys).cloned().collect(),
            removed: self.keys.difference(&next.keys).cloned().collect(),
        }
    }
}
