use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use super::event::PipelineEvent;

pub type Metadata = BTreeMap<String, String>;
pub type Tags = BTreeMap<String, String>;

/// Metadata shared by a batch of events (source, host, labels...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub metadata: Metadata,
    pub tags: Tags,
}

impl GroupInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }
}

/// Shared handle to a [`GroupInfo`], compared and hashed by identity.
///
/// Two handles are equal only if one was cloned from the other. Two `GroupInfo`
/// values with identical fields wrapped separately are different groups.
/// The handle keeps its allocation alive, so an address used as a map key is never
/// reused while the key exists.
#[derive(Clone)]
pub struct GroupRef(Arc<GroupInfo>);

impl GroupRef {
    pub fn new(info: GroupInfo) -> Self {
        Self(Arc::new(info))
    }

    pub fn ptr_eq(&self, other: &GroupRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn info(&self) -> &GroupInfo {
        &self.0
    }
}

impl From<GroupInfo> for GroupRef {
    fn from(info: GroupInfo) -> Self {
        Self::new(info)
    }
}

impl Deref for GroupRef {
    type Target = GroupInfo;

    fn deref(&self) -> &GroupInfo {
        &self.0
    }
}

impl PartialEq for GroupRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for GroupRef {}

impl Hash for GroupRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GroupRef")
            .field(&Arc::as_ptr(&self.0))
            .field(self.info())
            .finish()
    }
}

impl Serialize for GroupRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.info().serialize(serializer)
    }
}

/// One group together with the events collected for it, in arrival order.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineGroupEvents {
    pub group: GroupRef,
    pub events: Vec<PipelineEvent>,
}

impl PipelineGroupEvents {
    pub fn new(group: GroupRef, events: Vec<PipelineEvent>) -> Self {
        Self { group, events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
