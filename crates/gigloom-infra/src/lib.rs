//! Infrastructure layer for Gigloom.
//!
//! Implements the collaborator traits defined in `gigloom-core` against the
//! marketplace backend: the REST client (history, profile, rooms), the
//! WebSocket chat transport, environment credentials, and the on-disk
//! `config.toml` loader.

pub mod auth;
pub mod config;
pub mod rest;
pub mod ws;

pub use auth::EnvSessionAuth;
pub use rest::RestClient;
pub use ws::WsTransport;
