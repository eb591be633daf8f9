use crate::models::{GroupRef, PipelineEvent, PipelineGroupEvents};

/// Accepts everything and keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPipeCollector;

impl NoopPipeCollector {
    pub fn collect(&self, _group: &GroupRef, _events: Vec<PipelineEvent>) {}

    pub fn collect_list(&self, _groups: Vec<PipelineGroupEvents>) {}

    pub fn to_array(&self) -> Vec<PipelineGroupEvents> {
        Vec::new()
    }

    pub fn close(&self) {}
}
