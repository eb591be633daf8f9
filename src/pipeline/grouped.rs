use rustc_hash::FxHashMap;
use tracing::trace;

use crate::models::{GroupRef, PipelineEvent, PipelineGroupEvents};

/// Merges collected events per group and hands them out in one drain.
///
/// Groups are keyed by identity: batches for the same [`GroupRef`] are concatenated in
/// arrival order, separately created groups never merge. Writes take `&mut self`; there is
/// no internal locking. Cannot be observed, only drained with [`to_array`](Self::to_array).
#[derive(Debug, Default)]
pub struct GroupedPipeCollector {
    group_events: FxHashMap<GroupRef, Vec<PipelineEvent>>,
}

impl GroupedPipeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(&mut self, group: &GroupRef, events: Vec<PipelineEvent>) {
        if events.is_empty() {
            return;
        }
        self.group_events
            .entry(group.clone())
            .or_default()
            .extend(events);
    }

    pub fn collect_list(&mut self, groups: Vec<PipelineGroupEvents>) {
        for PipelineGroupEvents { group, events } in groups {
            self.collect(&group, events);
        }
    }

    /// Takes everything accumulated so far, one entry per group, in no particular order.
    pub fn to_array(&mut self) -> Vec<PipelineGroupEvents> {
        let drained = std::mem::take(&mut self.group_events);
        trace!(groups = drained.len(), "grouped collector drained");
        drained
            .into_iter()
            .map(|(group, events)| PipelineGroupEvents::new(group, events))
            .collect()
    }

    /// Drops accumulated state. The collector stays usable.
    pub fn close(&mut self) {
        self.group_events.clear();
    }

    pub fn group_count(&self) -> usize {
        self.group_events.len()
    }

    pub fn event_count(&self) -> usize {
        self.group_events.values().map(Vec::len).sum()
    }
}
