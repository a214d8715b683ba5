use std::time::{SystemTime, UNIX_EPOCH};

use crate::session::id::random_base36;

/// `X-Amzn-Trace-Id` value: version, hex epoch seconds, random suffix. Used
/// only for request correlation, never persisted.
pub fn generate_trace_id() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("1-{:x}-{}", secs, random_base36(96))
}
