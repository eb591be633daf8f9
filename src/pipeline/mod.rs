//! Event collection for pipeline stages.
//!
//! A stage gets a [`PipelineContext`] from one of the constructors and collects into its
//! [`PipelineCollector`]. Output is drained with `to_array` or, for the observable variant
//! only, consumed through the receiver returned by `observe`.

pub mod collector;
pub mod context;
pub mod grouped;
pub mod noop;
pub mod observe;

pub use collector::{CollectorError, CollectorKind, PipelineCollector, ReceiveError};
pub use context::{
    new_grouped_pipeline_context, new_noop_pipeline_context, new_observe_pipeline_context,
    PipelineContext,
};
pub use grouped::GroupedPipeCollector;
pub use noop::NoopPipeCollector;
pub use observe::{GroupEventsReceiver, ObservePipeCollector};
