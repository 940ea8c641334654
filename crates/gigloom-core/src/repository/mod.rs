//! REST collaborator traits.
//!
//! The infrastructure layer (gigloom-infra) implements these against the
//! marketplace backend; tests use in-memory fakes.

pub mod account;
pub mod history;

pub use account::AccountDirectory;
pub use history::HistoryStore;
