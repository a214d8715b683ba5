use std::sync::Arc;

use crate::session::manager::{SessionManager, SESSION_SLOT_KEY};
use crate::session::record::{SessionRecord, SESSION_RECORD_VERSION};
use crate::session::store::{MemorySessionStore, SessionStore};

#[cfg(test)]
mod tests {
    use super::*;

    const MS_PER_DAY: i64 = 86_400_000;

    fn now_ms() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    fn manager() -> (Arc<MemorySessionStore>, SessionManager) {
        let store = Arc::new(MemorySessionStore::new());
        let manager = SessionManager::new(store.clone());
        (store, manager)
    }

    fn seed_record(store: &MemorySessionStore, record: &SessionRecord) {
        let json = serde_json::to_string(record).expect("serialize record");
        store.put(SESSION_SLOT_KEY, &json).expect("seed record");
    }

    fn stored_record(store: &MemorySessionStore) -> SessionRecord {
        let raw = store
            .get(SESSION_SLOT_KEY)
            .expect("read slot")
            .expect("slot populated");
        serde_json::from_str(&raw).expect("parse record")
    }

    #[test]
    fn same_user_gets_the_same_session_within_ttl() {
        let (_, manager) = manager();
        let first = manager.get_or_create_session("u1").expect("first call");
        let second = manager.get_or_create_session("u1").expect("second call");
        assert_eq!(first, second);
    }

    #[test]
    fn reuse_advances_last_accessed() {
        let (store, manager) = manager();
        let id = manager.get_or_create_session("u1").expect("create");

        // age the record so the touch is observable
        let mut record = stored_record(&store);
        record.last_accessed_at_ms = record.created_at_ms - 1_000;
        seed_record(&store, &record);

        let reused = manager.get_or_create_session("u1").expect("reuse");
        assert_eq!(reused, id);
        let after = stored_record(&store);
        assert!(after.last_accessed_at_ms > record.last_accessed_at_ms);
        assert_eq!(after.created_at_ms, record.created_at_ms);
    }

    #[test]
    fn different_user_takes_over_the_slot() {
        let (_, manager) = manager();
        let a1 = manager.get_or_create_session("userA").expect("a1");
        let b = manager.get_or_create_session("userB").expect("b");
        assert_ne!(a1, b);
        // the slot now belongs to B, so A gets a third id
        let a2 = manager.get_or_create_session("userA").expect("a2");
        assert_ne!(a2, a1);
        assert_ne!(a2, b);
    }

    #[test]
    fn expired_record_is_replaced() {
        let (store, manager) = manager();
        let old_id = manager.get_or_create_session("u1").expect("create");
        let mut record = stored_record(&store);
        record.created_at_ms = now_ms() - 8 * MS_PER_DAY;
        seed_record(&store, &record);

        let fresh = manager.get_or_create_session("u1").expect("refresh");
        assert_ne!(fresh, old_id);
    }

    #[test]
    fn record_just_inside_ttl_survives() {
        let (store, manager) = manager();
        let id = manager.get_or_create_session("u1").expect("create");
        let mut record = stored_record(&store);
        record.created_at_ms = now_ms() - 6 * MS_PER_DAY;
        seed_record(&store, &record);

        assert_eq!(manager.get_or_create_session("u1").expect("reuse"), id);
    }

    #[test]
    fn corrupt_record_is_recovered_silently() {
        let (store, manager) = manager();
        store
            .put(SESSION_SLOT_KEY, "not json at all {{{")
            .expect("seed garbage");
        assert!(manager.current_session().expect("read").is_none());
        let id = manager.get_or_create_session("anyone").expect("recreate");
        assert!(!id.is_empty());
        assert_eq!(stored_record(&store).session_id, id);
    }

    #[test]
    fn record_with_unknown_version_is_discarded() {
        let (store, manager) = manager();
        let id = manager.get_or_create_session("u1").expect("create");
        let mut record = stored_record(&store);
        record.version = SESSION_RECORD_VERSION + 1;
        seed_record(&store, &record);

        assert!(manager.current_session().expect("read").is_none());
        assert_ne!(manager.get_or_create_session("u1").expect("recreate"), id);
    }

    #[test]
    fn clear_session_is_idempotent() {
        let (_, manager) = manager();
        manager.clear_session().expect("clear on empty slot");
        manager.get_or_create_session("u1").expect("create");
        manager.clear_session().expect("clear");
        manager.clear_session().expect("second clear");
        assert!(manager.current_session().expect("read").is_none());
    }

    #[test]
    fn start_new_session_always_rotates() {
        let (_, manager) = manager();
        let first = manager.get_or_create_session("u1").expect("create");
        let second = manager.start_new_session("u1").expect("rotate");
        assert_ne!(first, second);
        assert_eq!(manager.get_or_create_session("u1").expect("reuse"), second);
    }

    #[test]
    fn empty_user_id_gets_a_throwaway_id() {
        let (store, manager) = manager();
        let id = manager.get_or_create_session("").expect("degraded mode");
        assert!(!id.is_empty());
        assert!(store.get(SESSION_SLOT_KEY).expect("read").is_none());
        // and a second call does not reuse it
        assert_ne!(manager.get_or_create_session("  ").expect("again"), id);
    }

    #[test]
    fn session_age_reports_days_since_creation() {
        let (store, manager) = manager();
        assert!(manager.session_age_days().expect("empty").is_none());
        manager.get_or_create_session("u1").expect("create");
        assert_eq!(manager.session_age_days().expect("fresh"), Some(0));

        let mut record = stored_record(&store);
        record.created_at_ms = now_ms() - 3 * MS_PER_DAY - 60_000;
        seed_record(&store, &record);
        assert_eq!(manager.session_age_days().expect("aged"), Some(3));
    }

    #[test]
    fn custom_ttl_is_honored() {
        let store = Arc::new(MemorySessionStore::new());
        let manager = SessionManager::new(store.clone()).with_ttl_days(1);
        let id = manager.get_or_create_session("u1").expect("create");
        let mut record = stored_record(&store);
        record.created_at_ms = now_ms() - MS_PER_DAY;
        seed_record(&store, &record);
        assert_ne!(manager.get_or_create_session("u1").expect("rotate"), id);
    }
}
