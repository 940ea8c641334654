//! RestClient -- concrete [`HistoryStore`] and [`AccountDirectory`] for the
//! marketplace backend.
//!
//! Every request carries the session credential as a bearer token. A `401`
//! answer becomes [`ApiError::Unauthorized`] so callers can send the user
//! back to sign in; any other failure keeps its status and body.

use gigloom_core::repository::{AccountDirectory, HistoryStore};
use gigloom_types::auth::Credential;
use gigloom_types::chat::{ChatMessage, Profile, RoomId, RoomSummary};
use gigloom_types::config::ClientConfig;
use gigloom_types::error::ApiError;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{Envelope, MessageRecord, ProfileResponse};

/// HTTP client for the marketplace REST API.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

impl RestClient {
    /// Build a client for `config.base_url` with the configured timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("gigloom/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        credential: &Credential,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%method, %url, "marketplace request");

        let response = self
            .http
            .request(method, &url)
            .bearer_auth(credential.expose())
            .header("content-type", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("HTTP request failed: {e}")))?;

        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Deserialization(format!("failed to parse response: {e}")))
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

impl HistoryStore for RestClient {
    async fn fetch_messages(
        &self,
        room: &RoomId,
        credential: &Credential,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        let path = format!("/chats/chatrooms/{room}/messages/");
        let envelope: Envelope<Vec<MessageRecord>> =
            self.request(Method::GET, &path, credential).await?;

        let mut messages = envelope
            .into_data()?
            .into_iter()
            .map(MessageRecord::into_message)
            .collect::<Result<Vec<_>, _>>()?;
        // The page is not guaranteed to be ordered.
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }
}

impl AccountDirectory for RestClient {
    async fn fetch_profile(&self, credential: &Credential) -> Result<Profile, ApiError> {
        let response: ProfileResponse = self
            .request(Method::GET, "/accounts/get-my-info/", credential)
            .await?;
        Ok(response.user)
    }

    async fn list_rooms(&self, credential: &Credential) -> Result<Vec<RoomSummary>, ApiError> {
        let envelope: Envelope<Vec<RoomSummary>> = self
            .request(Method::GET, "/chats/chatrooms/", credential)
            .await?;
        envelope.into_data()
    }

    async fn close_room(&self, room: &RoomId, credential: &Credential) -> Result<(), ApiError> {
        let path = format!("/chats/chatrooms/{room}/close/");
        let envelope: Envelope<serde_json::Value> =
            self.request(Method::POST, &path, credential).await?;
        envelope.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> RestClient {
        let config = ClientConfig {
            base_url: format!("{}/", server.url()),
            ..ClientConfig::default()
        };
        RestClient::new(&config).unwrap()
    }

    fn token() -> Credential {
        Credential::new("tok-123")
    }

    #[tokio::test]
    async fn fetch_messages_sends_bearer_and_sorts_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/chats/chatrooms/42/messages/")
            .match_header("authorization", "Bearer tok-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success":true,"data":[
                    {"id":2,"content":"later","sender":9,"timestamp":"2024-03-01T12:31:00Z","room":42},
                    {"id":1,"content":"earlier","sender":"8","sender_name":"Bo","timestamp":"2024-03-01T12:30:00","room":42}
                ]}"#,
            )
            .create_async()
            .await;

        let messages = client(&server)
            .fetch_messages(&RoomId::from("42"), &token())
            .await
            .unwrap();

        mock.assert_async().await;
        let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["earlier", "later"]);
        assert_eq!(messages[0].sender_id.as_str(), "8");
        assert_eq!(messages[1].sender_id.as_str(), "9");
    }

    #[tokio::test]
    async fn unauthorized_is_distinct_from_other_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/chats/chatrooms/1/messages/")
            .with_status(401)
            .with_body(r#"{"detail":"token expired"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/chats/chatrooms/2/messages/")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = client(&server);
        let err = client
            .fetch_messages(&RoomId::from("1"), &token())
            .await
            .unwrap_err();
        assert!(err.is_auth_failure());

        let err = client
            .fetch_messages(&RoomId::from("2"), &token())
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_envelope_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/chats/chatrooms/3/messages/")
            .with_status(200)
            .with_body(r#"{"success":false,"message":"not a member"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .fetch_messages(&RoomId::from("3"), &token())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref r) if r == "not a member"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_deserialization_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/accounts/get-my-info/")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let err = client(&server).fetch_profile(&token()).await.unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[tokio::test]
    async fn fetch_profile_reads_user_object() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/accounts/get-my-info/")
            .match_header("authorization", "Bearer tok-123")
            .with_status(200)
            .with_body(r#"{"user":{"id":17,"name":"Ana","phone_number":"+100"}}"#)
            .create_async()
            .await;

        let profile = client(&server).fetch_profile(&token()).await.unwrap();
        assert_eq!(profile.id.as_str(), "17");
        assert_eq!(profile.name, "Ana");
        assert_eq!(profile.phone_number.as_deref(), Some("+100"));
    }

    #[tokio::test]
    async fn list_rooms_returns_summaries() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/chats/chatrooms/")
            .with_status(200)
            .with_body(
                r#"{"success":true,"data":[
                    {"chat_room_id":5,"other_person_name":"Bo","last_message":"see you","last_message_time":"2024-03-01T12:30:00Z"},
                    {"chat_room_id":6,"other_person_name":"Cy"}
                ]}"#,
            )
            .create_async()
            .await;

        let rooms = client(&server).list_rooms(&token()).await.unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].room_id.as_str(), "5");
        assert_eq!(rooms[0].last_message.as_deref(), Some("see you"));
        assert!(rooms[1].last_message.is_none());
    }

    #[tokio::test]
    async fn close_room_posts_and_checks_envelope() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("POST", "/chats/chatrooms/5/close/")
            .match_header("authorization", Matcher::Regex("^Bearer ".to_string()))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/chats/chatrooms/6/close/")
            .with_status(200)
            .with_body(r#"{"success":false,"error":"already closed"}"#)
            .create_async()
            .await;

        let client = client(&server);
        client.close_room(&RoomId::from("5"), &token()).await.unwrap();
        ok.assert_async().await;

        let err = client
            .close_room(&RoomId::from("6"), &token())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref r) if r == "already closed"));
    }
}
