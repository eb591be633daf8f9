use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Log,
    Metric,
    ByteArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricType {
    Counter,
    Gauge,
    Untyped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub name: String,
    pub level: String,
    pub body: String,
    pub offset: u64,
    pub timestamp: u64, // nanoseconds since epoch
    pub tags: BTreeMap<String, String>,
}

impl LogEvent {
    pub fn new(name: impl Into<String>, body: impl Into<String>, timestamp: u64) -> Self {
        Self {
            name: name.into(),
            level: "info".to_string(),
            body: body.into(),
            offset: 0,
            timestamp,
            tags: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEvent {
    pub name: String,
    pub metric_type: MetricType,
    pub value: f64,
    pub timestamp: u64,
    pub tags: BTreeMap<String, String>,
}

impl MetricEvent {
    pub fn gauge(name: impl Into<String>, value: f64, timestamp: u64) -> Self {
        Self {
            name: name.into(),
            metric_type: MetricType::Gauge,
            value,
            timestamp,
            tags: BTreeMap::new(),
        }
    }

    pub fn counter(name: impl Into<String>, value: f64, timestamp: u64) -> Self {
        Self {
            metric_type: MetricType::Counter,
            ..Self::gauge(name, value, timestamp)
        }
    }
}

/// A single telemetry record flowing through a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineEvent {
    Log(LogEvent),
    Metric(MetricEvent),
    ByteArray(Vec<u8>),
}

impl PipelineEvent {
    pub fn name(&self) -> &str {
        match self {
            PipelineEvent::Log(log) => &log.name,
            PipelineEvent::Metric(metric) => &metric.name,
            PipelineEvent::ByteArray(_) => "",
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            PipelineEvent::Log(_) => EventType::Log,
            PipelineEvent::Metric(_) => EventType::Metric,
            PipelineEvent::ByteArray(_) => EventType::ByteArray,
        }
    }

    /// Event time in nanoseconds. Raw byte arrays carry none and report 0.
    pub fn timestamp(&self) -> u64 {
        match self {
            PipelineEvent::Log(log) => log.timestamp,
            PipelineEvent::Metric(metric) => metric.timestamp,
            PipelineEvent::ByteArray(_) => 0,
        }
    }
}

impl From<LogEvent> for PipelineEvent {
    fn from(log: LogEvent) -> Self {
        PipelineEvent::Log(log)
    }
}

impl From<MetricEvent> for PipelineEvent {
    fn from(metric: MetricEvent) -> Self {
        PipelineEvent::Metric(metric)
    }
}

impl From<Vec<u8>> for PipelineEvent {
    fn from(bytes: Vec<u8>) -> Self {
        PipelineEvent::ByteArray(bytes)
    }
}
