//! Marketplace REST client.
//!
//! This module provides the [`RestClient`] which implements
//! [`HistoryStore`](gigloom_core::repository::HistoryStore) and
//! [`AccountDirectory`](gigloom_core::repository::AccountDirectory) against
//! the marketplace backend.

pub mod client;
pub mod types;

pub use client::RestClient;
