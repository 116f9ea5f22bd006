//! Adapter for the hosted inventory backend.
//!
//! The backend exposes one PostgREST-style table per entity kind, with
//! snake_case columns, server-issued ids and timestamps, and a `user_id`
//! column that every request is scoped to.

pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod rows;
pub mod store;

pub use client::RemoteClient;
pub use config::{RemoteConfig, Session};
pub use error::RemoteError;
pub use rows::Table;
pub use store::RemoteStore;
