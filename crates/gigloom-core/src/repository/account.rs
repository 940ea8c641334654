//! Account-side lookups around a chat: who am I, which rooms do I have, and
//! closing a room once the service is complete.

use gigloom_types::auth::Credential;
use gigloom_types::chat::{Profile, RoomId, RoomSummary};
use gigloom_types::error::ApiError;

pub trait AccountDirectory: Send + Sync {
    /// Profile of the signed-in user; its id is the local participant identity.
    fn fetch_profile(
        &self,
        credential: &Credential,
    ) -> impl std::future::Future<Output = Result<Profile, ApiError>> + Send;

    /// Conversations the signed-in user takes part in.
    fn list_rooms(
        &self,
        credential: &Credential,
    ) -> impl std::future::Future<Output = Result<Vec<RoomSummary>, ApiError>> + Send;

    /// Close a room after the transaction is completed.
    fn close_room(
        &self,
        room: &RoomId,
        credential: &Credential,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;
}
