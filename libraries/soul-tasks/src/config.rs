use serde::{Deserialize, Serialize};

/// Queue tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Tasks of one stage allowed to run at once (0 = unbounded)
    pub max_concurrent_tasks: usize,
    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 4,
            event_capacity: 256,
        }
    }
}

/// Which tasks are chained after a finished import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowUpPolicy {
    pub identify_after_import: bool,
    pub sort_after_import: bool,
}

impl Default for FollowUpPolicy {
    fn default() -> Self {
        Self {
            identify_after_import: true,
            sort_after_import: true,
        }
    }
}
