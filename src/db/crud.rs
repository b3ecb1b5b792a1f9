//! Table-level CRUD calls described by plain records.
//!
//! Unlike the fluent builder, these calls quote every table and column name
//! (`` `users` ``) and describe filters as column/value pairs: a list value
//! becomes `` `col` IN (...) ``, anything else `` `col` = value ``.

use crate::db::escape::{self, escape_id, escape_id_list};
use crate::error::{DbError, DbResult};
use crate::models::{QueryOutput, Value};
use std::future::Future;

/// Column/value filter, rendered as `AND`-joined equality or `IN` tests.
pub type Filter = Vec<(String, Value)>;

/// Options for [`Crud::select`] and [`Crud::count`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectConfig {
    pub columns: Vec<String>,
    pub filter: Filter,
    pub orders: Vec<(String, String)>,
    /// `None` or `Some(0)` means no limit.
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SelectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.push((column.into(), value.into()));
        self
    }

    pub fn order(mut self, column: impl Into<String>, direction: impl Into<String>) -> Self {
        self.orders.push((column.into(), direction.into()));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Capability interface shared by [`Session`](crate::db::Session) and
/// [`Transaction`](crate::db::Transaction).
pub trait Crud {
    fn select(
        &mut self,
        table: &str,
        config: &SelectConfig,
    ) -> impl Future<Output = DbResult<QueryOutput>> + Send;

    /// Like `select` with `COUNT(*) as count` as the only column.
    fn count(
        &mut self,
        table: &str,
        config: &SelectConfig,
    ) -> impl Future<Output = DbResult<QueryOutput>> + Send;

    /// Insert one or more rows. The first row's columns decide the column
    /// list for all rows.
    fn insert(
        &mut self,
        table: &str,
        rows: &[Vec<(String, Value)>],
    ) -> impl Future<Output = DbResult<QueryOutput>> + Send;

    /// Fails with `InvalidStatement` when `filter` is empty.
    fn update(
        &mut self,
        table: &str,
        row: &[(String, Value)],
        filter: &[(String, Value)],
    ) -> impl Future<Output = DbResult<QueryOutput>> + Send;

    fn delete(
        &mut self,
        table: &str,
        filter: &[(String, Value)],
    ) -> impl Future<Output = DbResult<QueryOutput>> + Send;

    fn raw_query(&mut self, sql: &str) -> impl Future<Output = DbResult<QueryOutput>> + Send;
}

pub fn select_sql(table: &str, config: &SelectConfig) -> String {
    let columns = if config.columns.is_empty() {
        "*".to_string()
    } else {
        escape_id_list(&config.columns, false)
    };
    format!(
        "SELECT {} FROM {}{}",
        columns,
        escape_id(table, false),
        tail_sql(config)
    )
}

pub fn count_sql(table: &str, config: &SelectConfig) -> String {
    format!(
        "SELECT COUNT(*) as count FROM {}{}",
        escape_id(table, false),
        tail_sql(config)
    )
}

pub fn insert_sql(table: &str, rows: &[Vec<(String, Value)>]) -> DbResult<String> {
    let columns: Vec<&str> = rows
        .first()
        .map(|row| row.iter().map(|(c, _)| c.as_str()).collect())
        .unwrap_or_default();
    if columns.is_empty() {
        return Err(DbError::invalid_statement(format!(
            "insert into {table} has no values"
        )));
    }

    let values: Vec<Value> = rows
        .iter()
        .map(|row| {
            Value::List(
                columns
                    .iter()
                    .map(|c| {
                        row.iter()
                            .find(|(name, _)| name == c)
                            .map(|(_, v)| v.clone())
                            .unwrap_or(Value::Null)
                    })
                    .collect(),
            )
        })
        .collect();
    let groups = vec!["(?)"; values.len()].join(", ");

    Ok(format!(
        "INSERT INTO {}({}) VALUES{}",
        escape_id(table, false),
        escape_id_list(&columns, false),
        escape::format(&groups, &values)
    ))
}

pub fn update_sql(
    table: &str,
    row: &[(String, Value)],
    filter: &[(String, Value)],
) -> DbResult<String> {
    if filter.is_empty() {
        return Err(DbError::invalid_statement(format!(
            "update of {table} requires a where clause"
        )));
    }
    if row.is_empty() {
        return Err(DbError::invalid_statement(format!(
            "update of {table} has no values to set"
        )));
    }
    let sets: Vec<String> = row
        .iter()
        .map(|(column, value)| format!("{} = {}", escape_id(column, false), escape::escape(value)))
        .collect();
    Ok(format!(
        "UPDATE {} SET {}{}",
        escape_id(table, false),
        sets.join(", "),
        where_sql(filter)
    ))
}

pub fn delete_sql(table: &str, filter: &[(String, Value)]) -> String {
    format!("DELETE FROM {}{}", escape_id(table, false), where_sql(filter))
}

fn tail_sql(config: &SelectConfig) -> String {
    let mut sql = where_sql(&config.filter);
    if !config.orders.is_empty() {
        let orders: Vec<String> = config
            .orders
            .iter()
            .map(|(column, direction)| {
                let upper = direction.to_ascii_uppercase();
                if upper == "ASC" || upper == "DESC" {
                    format!("{} {}", escape_id(column, false), upper)
                } else {
                    escape_id(column, false)
                }
            })
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&orders.join(", "));
    }
    match config.limit {
        Some(limit) if limit > 0 => {
            sql.push_str(&format!(" LIMIT {}, {}", config.offset.unwrap_or(0), limit));
        }
        _ => {}
    }
    sql
}

fn where_sql(filter: &[(String, Value)]) -> String {
    if filter.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = filter
        .iter()
        .map(|(column, value)| match value {
            Value::List(_) => format!("{} IN ({})", escape_id(column, false), escape::escape(value)),
            _ => format!("{} = {}", escape_id(column, false), escape::escape(value)),
        })
        .collect();
    format!(" WHERE {}", parts.join(" AND "))
}
