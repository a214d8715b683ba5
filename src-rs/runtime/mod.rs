pub mod body;
pub mod client;
pub mod identity;
pub mod trace;

pub use body::{CompletionBody, Utf8Accumulator};
pub use client::{RuntimeClient, SESSION_HEADER, TRACE_HEADER};
pub use identity::{IdentitySource, StaticIdentity};
pub use trace::generate_trace_id;
