pub mod config;
pub mod models;
pub mod pipeline;

pub use config::CollectorConfig;
pub use models::{GroupInfo, GroupRef, PipelineEvent, PipelineGroupEvents};
pub use pipeline::{CollectorError, PipelineCollector, PipelineContext};
