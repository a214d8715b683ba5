use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub const SESSION_RECORD_VERSION: u16 = 1;
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

const MS_PER_DAY: i64 = 86_400_000;

/// The single durable conversation record. At most one of these exists per
/// client instance; it ties a runtime session id to the user who created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub version: u16,
    pub session_id: String,
    pub user_id: String,
    pub created_at_ms: i64,
    pub last_accessed_at_ms: i64,
}

pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

impl SessionRecord {
    pub fn new(session_id: String, user_id: String) -> Self {
        let now = now_ms();
        Self {
            version: SESSION_RECORD_VERSION,
            session_id,
            user_id,
            created_at_ms: now,
            last_accessed_at_ms: now,
        }
    }

    /// Whole days since creation, clamped at zero against clock skew.
    pub fn age_days(&self, now_ms: i64) -> i64 {
        ((now_ms - self.created_at_ms) / MS_PER_DAY).max(0)
    }

    pub fn is_expired(&self, now_ms: i64, ttl_days: i64) -> bool {
        self.age_days(now_ms) >= ttl_days
    }

    pub fn owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    pub fn touch(&mut self) {
        self.last_accessed_at_ms = now_ms();
    }
}
