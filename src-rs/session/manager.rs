use anyhow::{Context, Result};
use std::sync::Arc;

use super::id::{generate_session_id, validate_session_id};
use super::record::{now_ms, SessionRecord, DEFAULT_SESSION_TTL_DAYS, SESSION_RECORD_VERSION};
use super::store::SessionStore;

pub const SESSION_SLOT_KEY: &str = "agent-session";

/// Keeps one durable conversation session per client instance.
///
/// Ownership and age are checked lazily on every read; the store has no
/// timers. There is no cross-instance locking either: if two clients race on
/// the same slot near the TTL boundary, the last writer wins.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    slot_key: String,
    ttl_days: i64,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            slot_key: SESSION_SLOT_KEY.to_string(),
            ttl_days: DEFAULT_SESSION_TTL_DAYS,
        }
    }

    pub fn with_ttl_days(mut self, ttl_days: i64) -> Self {
        if ttl_days > 0 {
            self.ttl_days = ttl_days;
        }
        self
    }

    pub fn with_slot_key(mut self, key: impl Into<String>) -> Self {
        self.slot_key = key.into();
        self
    }

    /// Returns the persisted session id for `user_id`, creating a fresh one
    /// when the slot is empty, unreadable, expired, or owned by someone else.
    ///
    /// An empty `user_id` yields a throwaway id that is never persisted.
    pub fn get_or_create_session(&self, user_id: &str) -> Result<String> {
        if user_id.trim().is_empty() {
            log::warn!("no authenticated user id; issuing a throwaway session id");
            return Ok(generate_session_id());
        }

        if let Some(mut record) = self.current_session()? {
            let now = now_ms();
            if !record.owned_by(user_id) {
                log::info!("stored session belongs to another user, starting over");
            } else if record.is_expired(now, self.ttl_days) {
                log::info!(
                    "stored session is {} days old (ttl {}), starting over",
                    record.age_days(now),
                    self.ttl_days
                );
            } else {
                record.touch();
                self.write(&record)?;
                return Ok(record.session_id);
            }
        }

        self.create(user_id)
    }

    /// Idempotent; clearing an empty slot is not an error.
    pub fn clear_session(&self) -> Result<()> {
        self.store.delete(&self.slot_key)
    }

    /// Always produces a new id, even when a valid session exists.
    pub fn start_new_session(&self, user_id: &str) -> Result<String> {
        self.clear_session()?;
        self.get_or_create_session(user_id)
    }

    /// Read-only view of the stored record. Unreadable data is discarded and
    /// reported as absent, never as an error.
    pub fn current_session(&self) -> Result<Option<SessionRecord>> {
        let Some(raw) = self.store.get(&self.slot_key)? else {
            return Ok(None);
        };
        let record: SessionRecord = match serde_json::from_str(&raw) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("discarding unreadable session record: {}", e);
                return Ok(None);
            }
        };
        if record.version != SESSION_RECORD_VERSION
            || validate_session_id(&record.session_id).is_err()
        {
            log::warn!("discarding session record with unusable contents");
            return Ok(None);
        }
        Ok(Some(record))
    }

    pub fn session_age_days(&self) -> Result<Option<i64>> {
        Ok(self.current_session()?.map(|r| r.age_days(now_ms())))
    }

    fn create(&self, user_id: &str) -> Result<String> {
        let record = SessionRecord::new(generate_session_id(), user_id.to_string());
        self.write(&record)?;
        log::debug!("created session {}", record.session_id);
        Ok(record.session_id)
    }

    fn write(&self, record: &SessionRecord) -> Result<()> {
        let json = serde_json::to_string(record).context("failed to serialize session record")?;
        self.store.put(&self.slot_key, &json)
    }
}
