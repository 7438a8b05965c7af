// src/differ.rs
use std::collections::HashSet;

use crate::model::IncidentUpdate;

/// Tracks seen update ids so the same update is never emitted twice.
///
/// Tracking individual update ids (rather than a per-incident "last
/// updated" marker) means every lifecycle transition fires its own event
/// even when an incident moves through several statuses between polls:
/// no intermediate step is lost, and nothing is re-emitted.
///
/// One instance per provider: update ids are not guaranteed to be
/// globally unique across providers. The seen-set grows monotonically for
/// the life of the process; incident-update volume is small enough that
/// pruning is not worth the complexity.
#[derive(Debug, Default)]
pub struct UpdateDiffer {
    seen_update_ids: HashSet<String>,
}

impl UpdateDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return only updates whose `update_id` has not been emitted before,
    /// preserving input order. Marks every returned id as seen.
    pub fn diff(&mut self, updates: Vec<IncidentUpdate>) -> Vec<IncidentUpdate> {
        let mut novel = Vec::new();
        for update in updates {
            if self.seen_update_ids.insert(update.update_id.clone()) {
                novel.push(update);
            }
        }
        novel
    }
}
