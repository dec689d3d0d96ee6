//! State combiner: demand × statuses × store → per-key entries

use crate::demand::DemandSet;
use crate::status::{CachedEntry, LoadingStatus};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Every demanded or stored key with its value and status
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedState<K, V> {
    entries: BTreeMap<K, CachedEntry<K, V>>,
}

impl<K, V> Default for CombinedState<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, V: Clone> CombinedState<K, V> {
    pub fn get(&self, key: &K) -> Option<&CachedEntry<K, V>> {
        self.entries.get(key)
    }

    /// Entries for `keys` in the given order; unknown keys are `Stale` with no value
    pub fn view(&self, keys: &[K]) -> Vec<CachedEntry<K, V>> {
        keys.iter()
            .map(|key| {
                self.entries
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| CachedEntry::stale(key.clone()))
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CachedEntry<K, V>> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merge the three inputs; keys without a status are `Stale`
pub fn combine<K, V>(
    demand: &DemandSet<K>,
    statuses: &HashMap<K, LoadingStatus>,
    store: impl IntoIterator<Item = (K, V)>,
) -> CombinedState<K, V>
where
    K: Ord + Clone + Hash,
{
    let status_of = |key: &K| statuses.get(key).copied().unwrap_or_default();

    let mut entries: BTreeMap<K, CachedEntry<K, V>> = store
        .into_iter()
        .map(|(key, value)| {
            let entry = CachedEntry {
                key: key.clone(),
                value: Some(value),
                status: status_of(&key),
            };
            (key, entry)
        })
        .collect();

    for key in demand.iter() {
        if !entries.contains_key(key) {
            entries.insert(
                key.clone(),
                CachedEntry {
                    key: key.clone(),
                    value: None,
                    status: status_of(key),
                },
            );
        }
    }

    CombinedState { entries }
}
