//! Id-keyed record cache and the rescan merge step.

use crate::{EnvironmentConfiguration, EnvironmentRecord};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Map from configuration id to its current record.
///
/// Not synchronized on its own; discovery keeps it behind the same lock it
/// uses for workspace switching.
#[derive(Debug, Default)]
pub(crate) struct RecordCache {
    records: BTreeMap<String, Arc<EnvironmentRecord>>,
}

impl RecordCache {
    /// Snapshot of every cached configuration, ordered by id.
    pub(crate) fn configurations(&self) -> Vec<EnvironmentConfiguration> {
        self.records
            .values()
            .map(|r| r.configuration().clone())
            .collect()
    }

    pub(crate) fn get(&self, id: &str) -> Option<Arc<EnvironmentRecord>> {
        self.records.get(id).cloned()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Replace the cache contents with `found`, returning whether anything
    /// changed.
    ///
    /// Records whose configuration is structurally unchanged are kept as-is,
    /// along with any factory they already built. New or changed ids get the
    /// fresh record; ids missing from `found` are dropped. When `found`
    /// repeats an id, the later entry wins.
    pub(crate) fn merge(&mut self, found: Vec<EnvironmentRecord>) -> bool {
        let mut changed = false;
        let mut seen = HashSet::with_capacity(found.len());

        let mut latest: Vec<EnvironmentRecord> = Vec::with_capacity(found.len());
        for record in found.into_iter().rev() {
            if seen.insert(record.id().to_string()) {
                latest.push(record);
            }
        }

        for record in latest {
            let unchanged = self
                .records
                .get(record.id())
                .is_some_and(|cached| cached.configuration() == record.configuration());
            if !unchanged {
                self.records.insert(record.id().to_string(), Arc::new(record));
                changed = true;
            }
        }

        let before = self.records.len();
        self.records.retain(|id, _| seen.contains(id));
        changed |= self.records.len() != before;

        changed
    }
}
