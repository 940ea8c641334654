//! Chat session logic and collaborator trait definitions for Gigloom.
//!
//! This crate defines the "ports" (collaborator traits) that the
//! infrastructure layer implements. It depends only on `gigloom-types` --
//! never on `gigloom-infra` or any network crate.

pub mod auth;
pub mod chat;
pub mod event;
pub mod repository;
pub mod transport;
