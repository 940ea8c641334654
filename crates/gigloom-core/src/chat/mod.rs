//! Real-time chat for a single room.
//!
//! `ChatSession` owns one live connection per opened room, merges the
//! history page with live frames into one ordered, de-duplicated
//! [`Timeline`], and reconnects with a bounded linear backoff.

mod driver;
pub mod reconnect;
pub mod session;
pub mod timeline;

#[cfg(test)]
pub(crate) mod testing;

pub use reconnect::{ReconnectDecision, ReconnectPolicy, ReconnectTracker};
pub use session::{ChatSession, SessionOptions};
pub use timeline::Timeline;
