//! # jotter-store
//!
//! SQLite persistence for the jotter backend.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for the two domain
//! models: users and notes.  Every note query is scoped by owner id, so a
//! caller can never reach another user's records through this API.

pub mod database;
pub mod migrations;
pub mod models;
pub mod notes;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
