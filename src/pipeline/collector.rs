use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grouped::GroupedPipeCollector;
use super::noop::NoopPipeCollector;
use super::observe::{GroupEventsReceiver, ObservePipeCollector};
use crate::models::{GroupRef, PipelineEvent, PipelineGroupEvents};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CollectorError {
    /// The collector was closed before or while the write was in flight.
    #[error("collector closed")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReceiveError {
    #[error("timed out waiting for events")]
    Timeout,
    #[error("collector closed and drained")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectorKind {
    Observe,
    Grouped,
    Noop,
}

/// The collection strategy bound to a pipeline stage.
///
/// All variants honor the same contract: empty input is ignored, events of one group keep
/// their arrival order, and a drain removes what it returns.
#[derive(Debug)]
pub enum PipelineCollector {
    Observe(ObservePipeCollector),
    Grouped(GroupedPipeCollector),
    Noop(NoopPipeCollector),
}

impl PipelineCollector {
    pub fn kind(&self) -> CollectorKind {
        match self {
            PipelineCollector::Observe(_) => CollectorKind::Observe,
            PipelineCollector::Grouped(_) => CollectorKind::Grouped,
            PipelineCollector::Noop(_) => CollectorKind::Noop,
        }
    }

    /// Collects `events` under `group`.
    ///
    /// Only the observable variant can fail, with [`CollectorError::Closed`], and only it
    /// blocks (while its queue is full).
    pub fn collect(&mut self, group: &GroupRef, events: Vec<PipelineEvent>) -> Result<(), CollectorError> {
        match self {
            PipelineCollector::Observe(c) => c.collect(group, events),
            PipelineCollector::Grouped(c) => {
                c.collect(group, events);
                Ok(())
            }
            PipelineCollector::Noop(c) => {
                c.collect(group, events);
                Ok(())
            }
        }
    }

    pub fn collect_list(&mut self, groups: Vec<PipelineGroupEvents>) -> Result<(), CollectorError> {
        match self {
            PipelineCollector::Observe(c) => c.collect_list(groups),
            PipelineCollector::Grouped(c) => {
                c.collect_list(groups);
                Ok(())
            }
            PipelineCollector::Noop(c) => {
                c.collect_list(groups);
                Ok(())
            }
        }
    }

    pub fn to_array(&mut self) -> Vec<PipelineGroupEvents> {
        match self {
            PipelineCollector::Observe(c) => c.to_array(),
            PipelineCollector::Grouped(c) => c.to_array(),
            PipelineCollector::Noop(c) => c.to_array(),
        }
    }

    /// Streaming handle over collected batches. `None` for variants that can only be drained.
    pub fn observe(&self) -> Option<GroupEventsReceiver> {
        match self {
            PipelineCollector::Observe(c) => Some(c.observe()),
            PipelineCollector::Grouped(_) | PipelineCollector::Noop(_) => None,
        }
    }

    pub fn close(&mut self) {
        match self {
            PipelineCollector::Observe(c) => c.close(),
            PipelineCollector::Grouped(c) => c.close(),
            PipelineCollector::Noop(c) => c.close(),
        }
    }

    pub fn is_observable(&self) -> bool {
        matches!(self, PipelineCollector::Observe(_))
    }

    /// The shared observable collector, for wiring extra producer threads.
    pub fn as_observe(&self) -> Option<&ObservePipeCollector> {
        match self {
            PipelineCollector::Observe(c) => Some(c),
            _ => None,
        }
    }
}

impl From<ObservePipeCollector> for PipelineCollector {
    fn from(collector: ObservePipeCollector) -> Self {
        PipelineCollector::Observe(collector)
    }
}

impl From<GroupedPipeCollector> for PipelineCollector {
    fn from(collector: GroupedPipeCollector) -> Self {
        PipelineCollector::Grouped(collector)
    }
}

impl From<NoopPipeCollector> for PipelineCollector {
    fn from(collector: NoopPipeCollector) -> Self {
        PipelineCollector::Noop(collector)
    }
}
