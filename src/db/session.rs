//! Pool-backed session.

use crate::db::builder::{Query, TableRef};
use crate::db::crud::{self, Crud, SelectConfig};
use crate::db::escape;
use crate::db::executor::Target;
use crate::db::transaction::Transaction;
use crate::error::DbResult;
use crate::models::{IntoArgs, QueryOutput, Value};
use sqlx::MySqlPool;

/// Entry point for statements outside a transaction.
///
/// A session is a cheap handle: cloning it shares the pool. Every statement
/// acquires its own connection for the duration of [`Query::exec`], so
/// statements from clones or concurrent tasks never share builder state.
#[derive(Debug, Clone)]
pub struct Session {
    pool: MySqlPool,
    log: bool,
}

impl Session {
    pub(crate) fn new(pool: MySqlPool) -> Self {
        Self { pool, log: false }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub fn log_enabled(&self) -> bool {
        self.log
    }

    /// Return a handle with statement logging switched on or off.
    pub fn logs(mut self, enabled: bool) -> Self {
        self.log = enabled;
        self
    }

    /// Start a statement against `name`.
    pub fn table(&self, name: impl Into<String>) -> TableRef<'_> {
        TableRef::new(Target::Pool(&self.pool), name, self.log)
    }

    /// Raw SQL, sent as given.
    pub fn query(&self, sql: impl Into<String>) -> Query<'_> {
        Query::new(Target::Pool(&self.pool), sql, self.log)
    }

    /// Raw SQL with `?` / `??` placeholders filled from `args`.
    pub fn query_with(&self, template: &str, args: impl IntoArgs) -> Query<'_> {
        let sql = escape::format(template, &args.into_args());
        self.query(sql)
    }

    /// Acquire a connection and open a transaction on it.
    pub async fn begin_transaction(&self) -> DbResult<Transaction> {
        Transaction::begin(&self.pool, self.log).await
    }
}

impl Crud for Session {
    async fn select(&mut self, table: &str, config: &SelectConfig) -> DbResult<QueryOutput> {
        self.query(crud::select_sql(table, config)).exec().await
    }

    async fn count(&mut self, table: &str, config: &SelectConfig) -> DbResult<QueryOutput> {
        self.query(crud::count_sql(table, config)).exec().await
    }

    async fn insert(&mut self, table: &str, rows: &[Vec<(String, Value)>]) -> DbResult<QueryOutput> {
        let sql = crud::insert_sql(table, rows)?;
        self.query(sql).exec().await
    }

    async fn update(
        &mut self,
        table: &str,
        row: &[(String, Value)],
        filter: &[(String, Value)],
    ) -> DbResult<QueryOutput> {
        let sql = crud::update_sql(table, row, filter)?;
        self.query(sql).exec().await
    }

    async fn delete(&mut self, table: &str, filter: &[(String, Value)]) -> DbResult<QueryOutput> {
        self.query(crud::delete_sql(table, filter)).exec().await
    }

    async fn raw_query(&mut self, sql: &str) -> DbResult<QueryOutput> {
        self.query(sql).exec().await
    }
}
