//! Statement execution.
//!
//! Every statement, built or raw, ends up in [`run`]: it resolves the
//! [`Target`] to a connection (acquiring one from the pool when needed),
//! sends the SQL text as-is and collects every result set and affected-row
//! count the server returns.
//!
//! With statement logging on, the SQL and its outcome are logged at `info`
//! (`error` on failure); otherwise the same events are emitted at `trace`.

use crate::db::types::RowToJson;
use crate::error::DbResult;
use crate::models::QueryOutput;
use futures_util::TryStreamExt;
use sqlx::mysql::MySqlConnection;
use sqlx::{Either, MySqlPool};
use std::time::Instant;
use tracing::{error, info, trace};
use uuid::Uuid;

/// Where a statement is sent.
#[derive(Debug)]
pub enum Target<'c> {
    /// A connection is acquired for the statement and released afterwards.
    Pool(&'c MySqlPool),
    /// The connection of an open transaction.
    Transaction {
        conn: &'c mut MySqlConnection,
        id: Uuid,
    },
}

impl Target<'_> {
    fn transaction_id(&self) -> Option<Uuid> {
        match self {
            Self::Pool(_) => None,
            Self::Transaction { id, .. } => Some(*id),
        }
    }
}

/// Execute `sql` on `target`.
///
/// Acquisition and execution errors are returned unchanged; nothing is retried.
pub async fn run(target: Target<'_>, sql: &str, log: bool) -> DbResult<QueryOutput> {
    let start = Instant::now();
    let transaction_id = target.transaction_id().map(|id| id.to_string());
    let transaction_id = transaction_id.as_deref().unwrap_or("");

    if log {
        info!(sql = %sql, transaction_id, "Executing statement");
    } else {
        trace!(sql = %sql, transaction_id, "Executing statement");
    }

    let result = match target {
        Target::Pool(pool) => match pool.acquire().await {
            // The pooled connection goes back to the pool when dropped.
            Ok(mut conn) => fetch_all(&mut conn, sql).await,
            Err(e) => Err(e),
        },
        Target::Transaction { conn, .. } => fetch_all(conn, sql).await,
    };

    match result {
        Ok(mut output) => {
            output.execution_time_ms = start.elapsed().as_millis() as u64;
            if log {
                info!(
                    sql = %sql,
                    transaction_id,
                    rows = output.rows.len(),
                    rows_affected = output.rows_affected,
                    execution_time_ms = output.execution_time_ms,
                    "Statement succeeded"
                );
            } else {
                trace!(
                    sql = %sql,
                    transaction_id,
                    rows = output.rows.len(),
                    rows_affected = output.rows_affected,
                    "Statement succeeded"
                );
            }
            Ok(output)
        }
        Err(e) => {
            if log {
                error!(sql = %sql, transaction_id, error = %e, "Statement failed");
            } else {
                trace!(sql = %sql, transaction_id, error = %e, "Statement failed");
            }
            Err(e.into())
        }
    }
}

async fn fetch_all(conn: &mut MySqlConnection, sql: &str) -> Result<QueryOutput, sqlx::Error> {
    let mut output = QueryOutput::default();
    // Text protocol: multi-statement strings and DDL go through unchanged.
    let mut stream = sqlx::raw_sql(sql).fetch_many(&mut *conn);

    while let Some(item) = stream.try_next().await? {
        match item {
            Either::Left(done) => {
                output.rows_affected += done.rows_affected();
                let id = done.last_insert_id();
                if id > 0 {
                    output.last_insert_id = Some(id);
                }
            }
            Either::Right(row) => {
                if output.columns.is_empty() {
                    output.columns = row.get_column_metadata();
                }
                output.rows.push(row.to_json_map());
            }
        }
    }

    Ok(output)
}
