//! Application state wiring the marketplace clients together.

use std::path::PathBuf;
use std::sync::Arc;

use gigloom_core::auth::{SessionAuth, StaticSessionAuth};
use gigloom_infra::config::{load_client_config, resolve_data_dir};
use gigloom_infra::{EnvSessionAuth, RestClient, WsTransport};
use gigloom_types::auth::Credential;
use gigloom_types::config::ClientConfig;
use gigloom_types::error::SessionError;

/// Shared state for every command.
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub data_dir: PathBuf,
    pub rest: Arc<RestClient>,
    pub transport: Arc<WsTransport>,
    pub auth: Arc<dyn SessionAuth>,
}

impl AppState {
    /// Load `config.toml`, apply CLI overrides, and build the clients.
    pub async fn init(base_url: Option<&str>, token: Option<String>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let mut config = load_client_config(&data_dir).await;
        if let Some(url) = base_url {
            config.base_url = url.to_string();
        }
        tracing::debug!(base_url = %config.base_url, data_dir = %data_dir.display(), "client configured");

        let auth: Arc<dyn SessionAuth> = match token {
            Some(token) => Arc::new(StaticSessionAuth::new(Some(Credential::new(token)))),
            None => Arc::new(EnvSessionAuth::new()),
        };

        Ok(Self {
            rest: Arc::new(RestClient::new(&config)?),
            transport: Arc::new(WsTransport::new(config.base_url.clone())),
            config,
            data_dir,
            auth,
        })
    }

    /// The current credential, or an auth error when signed out.
    pub fn credential(&self) -> Result<Credential, SessionError> {
        self.auth.credential().ok_or(SessionError::MissingCredential)
    }
}
