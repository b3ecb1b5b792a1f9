//! Connection-bound transaction.
//!
//! A [`Transaction`] owns one pooled connection on which `BEGIN` has been
//! issued. Statements built from it run on that connection only. `commit`
//! and `rollback` take the transaction by value, so it cannot be used
//! afterwards; either way the connection goes back to the pool. Dropping an
//! open transaction rolls it back.

use crate::db::builder::{Query, TableRef};
use crate::db::crud::{self, Crud, SelectConfig};
use crate::db::escape;
use crate::db::executor::Target;
use crate::error::DbResult;
use crate::models::{IntoArgs, QueryOutput, Value};
use sqlx::{MySql, MySqlPool};
use tracing::{error, info};
use uuid::Uuid;

pub struct Transaction {
    tx: sqlx::Transaction<'static, MySql>,
    id: Uuid,
    log: bool,
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl Transaction {
    pub(crate) async fn begin(pool: &MySqlPool, log: bool) -> DbResult<Self> {
        let tx = match pool.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                if log {
                    error!(error = %e, "Failed to begin transaction");
                }
                return Err(e.into());
            }
        };
        let id = Uuid::new_v4();

        info!(transaction_id = %id, "Transaction started (MySQL)");

        Ok(Self { tx, id, log })
    }

    /// Identifier carried by this transaction's log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Switch statement logging on or off for statements built from here.
    pub fn logs(mut self, enabled: bool) -> Self {
        self.log = enabled;
        self
    }

    pub fn table(&mut self, name: impl Into<String>) -> TableRef<'_> {
        let log = self.log;
        TableRef::new(self.target(), name, log)
    }

    pub fn query(&mut self, sql: impl Into<String>) -> Query<'_> {
        let log = self.log;
        Query::new(self.target(), sql, log)
    }

    pub fn query_with(&mut self, template: &str, args: impl IntoArgs) -> Query<'_> {
        let sql = escape::format(template, &args.into_args());
        self.query(sql)
    }

    fn target(&mut self) -> Target<'_> {
        Target::Transaction {
            conn: &mut *self.tx,
            id: self.id,
        }
    }

    pub async fn commit(self) -> DbResult<()> {
        let id = self.id;
        self.tx.commit().await?;
        info!(transaction_id = %id, "Transaction committed");
        Ok(())
    }

    pub async fn rollback(self) -> DbResult<()> {
        let id = self.id;
        self.tx.rollback().await?;
        info!(transaction_id = %id, "Transaction rolled back");
        Ok(())
    }
}

impl Crud for Transaction {
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
