//! Fluent statement constructors.
//!
//! `session.table("users")` returns a [`TableRef`]; from there `select()`,
//! `insert()`, `replace()`, `update()`, `delete()` or `count()` hand back a
//! constructor that owns a fresh [`Statement`]. `finish()` renders it into a
//! [`Query`] bound to the same session or transaction, and [`Query::exec`]
//! sends it.
//!
//! ```ignore
//! let rows = session
//!     .table("players")
//!     .select()
//!     .and_where("id = ?", 100)
//!     .finish()?
//!     .exec()
//!     .await?;
//! ```

use crate::db::executor::{self, Target};
use crate::db::macros::{impl_draft_common, impl_where_clause};
use crate::db::statement::{Statement, StatementKind};
use crate::error::DbResult;
use crate::models::{QueryOutput, Value};
use serde_json::Value as JsonValue;

/// Statement under construction plus where it will run.
#[derive(Debug)]
struct Draft<'c> {
    target: Target<'c>,
    statement: Statement,
    log: bool,
}

impl<'c> Draft<'c> {
    fn finish(mut self) -> DbResult<Query<'c>> {
        self.statement.finish()?;
        Ok(Query {
            target: self.target,
            sql: self.statement.sql().to_string(),
            log: self.log,
        })
    }
}

/// Entry point for statements against one table.
///
/// The table name is written into the SQL verbatim, so `schema.table`,
/// aliases (`orders o`) and pre-quoted names all work.
#[derive(Debug)]
pub struct TableRef<'c> {
    target: Target<'c>,
    table: String,
    log: bool,
}

impl<'c> TableRef<'c> {
    pub(crate) fn new(target: Target<'c>, table: impl Into<String>, log: bool) -> Self {
        Self {
            target,
            table: table.into(),
            log,
        }
    }

    pub fn name(&self) -> &str {
        &self.table
    }

    /// Enable or disable statement logging for statements built from here.
    pub fn logs(mut self, enabled: bool) -> Self {
        self.log = enabled;
        self
    }

    fn draft(self, kind: StatementKind) -> Draft<'c> {
        Draft {
            target: self.target,
            statement: Statement::new(self.table, kind),
            log: self.log,
        }
    }

    pub fn select(self) -> Select<'c> {
        Select {
            draft: self.draft(StatementKind::Select),
        }
    }

    /// Select pre-configured with `COUNT(*) as count`.
    pub fn count(self) -> Select<'c> {
        self.select().column("COUNT(*) as count")
    }

    pub fn insert(self) -> Insert<'c> {
        Insert {
            draft: self.draft(StatementKind::Insert),
        }
    }

    /// Like [`insert`](Self::insert), rendered as `REPLACE INTO`.
    pub fn replace(self) -> Insert<'c> {
        Insert {
            draft: self.draft(StatementKind::Replace),
        }
    }

    pub fn update(self) -> Update<'c> {
        Update {
            draft: self.draft(StatementKind::Update),
        }
    }

    pub fn delete(self) -> Delete<'c> {
        Delete {
            draft: self.draft(StatementKind::Delete),
        }
    }
}

#[derive(Debug)]
pub struct Select<'c> {
    draft: Draft<'c>,
}

impl<'c> Select<'c> {
    /// Add an output column or expression. Without any, `*` is selected.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.draft.statement.push_column(column);
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            self.draft.statement.push_column(column);
        }
        self
    }

    /// Add a join fragment, emitted verbatim after the table.
    pub fn join(mut self, join: impl Into<String>) -> Self {
        self.draft.statement.push_join(join);
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.draft.statement.push_group(column);
        self
    }

    /// Order by `column`. `direction` is matched case-insensitively against
    /// `asc`/`desc`; any other value leaves the column without a direction.
    pub fn order_by(mut self, column: impl Into<String>, direction: impl Into<String>) -> Self {
        self.draft.statement.push_order(column, direction);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.draft.statement.set_limit(Some(limit));
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.draft.statement.set_offset(Some(offset));
        self
    }

    pub fn finish(self) -> DbResult<Query<'c>> {
        self.draft.finish()
    }
}

/// Insert or replace constructor.
#[derive(Debug)]
pub struct Insert<'c> {
    draft: Draft<'c>,
}

impl<'c> Insert<'c> {
    /// Set one column of the current row. Setting a column twice keeps its
    /// first position and the last value.
    pub fn value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.draft.statement.push_value(column, value.into());
        self
    }

    /// Set several columns of the current row, in iteration order.
    pub fn values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (column, value) in values {
            self.draft.statement.push_value(column, value.into());
        }
        self
    }

    /// Set columns of the current row from a JSON object, in key order.
    pub fn values_json(self, object: serde_json::Map<String, JsonValue>) -> Self {
        self.values(object)
    }

    /// Start another row. The first row's columns decide the column list;
    /// columns missing from a later row are inserted as `NULL`.
    pub fn row(mut self) -> Self {
        self.draft.statement.start_row();
        self
    }

    pub fn finish(self) -> DbResult<Query<'c>> {
        self.draft.finish()
    }
}

#[derive(Debug)]
pub struct Update<'c> {
    draft: Draft<'c>,
}

impl<'c> Update<'c> {
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.draft.statement.push_set(column, value.into());
        self
    }

    pub fn set_all<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (column, value) in values {
            self.draft.statement.push_set(column, value.into());
        }
        self
    }

    pub fn set_json(self, object: serde_json::Map<String, JsonValue>) -> Self {
        self.set_all(object)
    }

    /// Fails with `InvalidStatement` when no where clause or no value was given.
    pub fn finish(self) -> DbResult<Query<'c>> {
        self.draft.finish()
    }
}

#[derive(Debug)]
pub struct Delete<'c> {
    draft: Draft<'c>,
}

impl<'c> Delete<'c> {
    /// Without a where clause every row of the table is deleted.
    pub fn finish(self) -> DbResult<Query<'c>> {
        self.draft.finish()
    }
}

impl_draft_common!(Select, Insert, Update, Delete);
impl_where_clause!(Select, Update, Delete);

/// A rendered statement ready to run.
#[derive(Debug)]
pub struct Query<'c> {
    target: Target<'c>,
    sql: String,
    log: bool,
}

impl<'c> Query<'c> {
    pub(crate) fn new(target: Target<'c>, sql: impl Into<String>, log: bool) -> Self {
        Self {
            target,
            sql: sql.into(),
            log,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn logs(mut self, enabled: bool) -> Self {
        self.log = enabled;
        self
    }

    /// Send the statement and collect what the server returns.
    pub async fn exec(self) -> DbResult<QueryOutput> {
        executor::run(self.target, &self.sql, self.log).await
    }
}
