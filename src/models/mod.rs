//! Data models for fluent-orm.
//!
//! This module re-exports all model types used throughout the crate.

pub mod connection;
pub mod query;
pub mod value;

// Re-export commonly used types
pub use connection::{Backend, ConnectionConfig, ConnectionConfigError};
pub use query::{ColumnMetadata, QueryOutput};
pub use value::{Args, IntoArgs, Literal, Value, now};
