pub mod id;
pub mod manager;
pub mod record;
pub mod store;

pub use id::{generate_session_id, random_base36, validate_session_id};
pub use manager::{SessionManager, SESSION_SLOT_KEY};
pub use record::{SessionRecord, DEFAULT_SESSION_TTL_DAYS, SESSION_RECORD_VERSION};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
