//! Historical message page for a room.

use gigloom_types::auth::Credential;
use gigloom_types::chat::{ChatMessage, RoomId};
use gigloom_types::error::ApiError;

/// Read access to a room's past messages.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait HistoryStore: Send + Sync {
    /// Fetch the room's message page, ordered by `created_at` ascending.
    ///
    /// A rejected credential is reported as [`ApiError::Unauthorized`], kept
    /// distinct from network failures.
    fn fetch_messages(
        &self,
        room: &RoomId,
        credential: &Credential,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, ApiError>> + Send;
}
