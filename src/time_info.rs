use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamps tracked for every group and entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeInfo {
    pub creation_time: DateTime<Utc>,
    pub last_modification_time: DateTime<Utc>,
    pub last_access_time: DateTime<Utc>,
    /// `None` means the node never expires.
    pub expiry_time: Option<DateTime<Utc>>,
}

impl Default for TimeInfo {
    fn default() -> Self {
        Self::now()
    }
}

impl TimeInfo {
    /// All timestamps set to the current time, no expiry.
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            creation_time: now,
            last_modification_time: now,
            last_access_time: now,
            expiry_time: None,
        }
    }

    /// Record a modification at the current time.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.last_modification_time = now;
        self.last_access_time = now;
    }

    /// Whether the node has expired at `at`.
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        self.expiry_time.is_some_and(|expiry| expiry <= at)
    }
}
