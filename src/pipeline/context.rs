use std::num::NonZeroUsize;

use tracing::debug;

use super::collector::PipelineCollector;
use super::grouped::GroupedPipeCollector;
use super::noop::NoopPipeCollector;
use super::observe::ObservePipeCollector;
use crate::config::CollectorConfig;

/// Binds one collector to a pipeline stage for the stage's lifetime.
#[derive(Debug)]
pub struct PipelineContext {
    collector: PipelineCollector,
}

impl PipelineContext {
    fn new(collector: PipelineCollector) -> Self {
        debug!(kind = ?collector.kind(), "pipeline context created");
        Self { collector }
    }

    /// Context over a bounded queue holding at most `queue_size` batches.
    pub fn observe(queue_size: NonZeroUsize) -> Self {
        Self::new(ObservePipeCollector::new(queue_size.get()).into())
    }

    pub fn grouped() -> Self {
        Self::new(GroupedPipeCollector::new().into())
    }

    pub fn noop() -> Self {
        Self::new(NoopPipeCollector.into())
    }

    pub fn from_config(config: &CollectorConfig) -> Self {
        match *config {
            CollectorConfig::Observe { queue_size } => Self::observe(queue_size),
            CollectorConfig::Grouped => Self::grouped(),
            CollectorConfig::Noop => Self::noop(),
        }
    }

    pub fn collector(&self) -> &PipelineCollector {
        &self.collector
    }

    pub fn collector_mut(&mut self) -> &mut PipelineCollector {
        &mut self.collector
    }

    pub fn into_collector(self) -> PipelineCollector {
        self.collector
    }
}

pub fn new_observe_pipeline_context(queue_size: NonZeroUsize) -> PipelineContext {
    PipelineContext::observe(queue_size)
}

pub fn new_grouped_pipeline_context() -> PipelineContext {
    PipelineContext::grouped()
}

pub fn new_noop_pipeline_context() -> PipelineContext {
    PipelineContext::noop()
}
