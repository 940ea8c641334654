//! Shared domain types for Gigloom.
//!
//! This crate contains the types used across the Gigloom chat client:
//! chat messages, connection state, session events, wire frames, the
//! bearer credential, client configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, secrecy.

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod frame;
