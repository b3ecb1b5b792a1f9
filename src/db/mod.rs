//! Relational database layer.
//!
//! This module provides:
//! - Value and identifier escaping
//! - The statement accumulator and its fluent constructors
//! - Pool-backed sessions and connection-bound transactions
//! - Table-level CRUD calls over either of them
//! - Pool construction and the named session registry

pub mod builder;
pub mod crud;
pub mod escape;
pub mod executor;
mod macros;
pub mod pool;
pub mod session;
pub mod statement;
pub mod transaction;
pub mod types;

pub use builder::{Delete, Insert, Query, Select, TableRef, Update};
pub use crud::{Crud, Filter, SelectConfig};
pub use escape::{escape, escape_id, escape_id_list, escape_string, format};
pub use executor::Target;
pub use pool::{Orm, Registry};
pub use session::Session;
pub use statement::{Statement, StatementKind};
pub use transaction::Transaction;
