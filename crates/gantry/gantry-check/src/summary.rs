//! Summary statistics for a check run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What a successful run looked at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSummary {
    /// Files that passed the kind/generated filters and were considered.
    pub files_checked: usize,
    /// Check tasks dispatched (one per claiming target per file).
    pub tasks_run: usize,
    /// Wall-clock duration of the run.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

// Custom serialization for Duration as milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
