//! SQLite backend for the wordcard vocabulary store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.
//!
//! Layers, leaves first:
//!
//! - [`entity`] — descriptor tables mapping row types to ordered
//!   column/value pairs.
//! - [`clause`] — ordered equality conditions rendered as parameterised
//!   `WHERE` / `SET` fragments.
//! - [`Dao`] — the generic insert / select / update / delete gateway.
//! - [`SqliteStore`] — composite record operations on top of the gateway.

pub mod clause;
pub mod entity;
pub mod error;
pub mod schema;

mod dao;
mod encode;
mod store;

pub use clause::Conditions;
pub use dao::Dao;
pub use entity::{Entity, Value};
pub use error::{Error, MappingError, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
