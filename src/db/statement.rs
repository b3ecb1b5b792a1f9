//! Statement accumulator and SQL rendering.
//!
//! A [`Statement`] collects the clauses of one select, insert, replace,
//! update or delete and renders them into a single semicolon-terminated
//! string. Table and column names are written exactly as given; values and
//! where-template arguments go through [`escape`](crate::db::escape).

use crate::db::escape;
use crate::error::{DbError, DbResult};
use crate::models::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Replace,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Replace => "replace",
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One where fragment: a `?` template and the arguments it consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub template: String,
    pub args: Vec<Value>,
}

impl WhereClause {
    fn render(&self) -> String {
        escape::format(&self.template, &self.args)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    table: String,
    kind: StatementKind,
    wheres: Vec<WhereClause>,
    joins: Vec<String>,
    columns: Vec<String>,
    orders: Vec<(String, String)>,
    groups: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    /// Insert payload, one ordered column list per row.
    rows: Vec<Vec<(String, Value)>>,
    /// Update payload.
    sets: Vec<(String, Value)>,
    sql: String,
}

impl Statement {
    pub fn new(table: impl Into<String>, kind: StatementKind) -> Self {
        Self {
            table: table.into(),
            kind,
            wheres: Vec::new(),
            joins: Vec::new(),
            columns: Vec::new(),
            orders: Vec::new(),
            groups: Vec::new(),
            limit: None,
            offset: None,
            rows: Vec::new(),
            sets: Vec::new(),
            sql: String::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// SQL produced by the last [`finish`](Self::finish), empty before that.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn has_where(&self) -> bool {
        !self.wheres.is_empty()
    }

    pub fn push_where(&mut self, template: impl Into<String>, args: Vec<Value>) {
        self.wheres.push(WhereClause {
            template: template.into(),
            args,
        });
    }

    pub fn push_join(&mut self, join: impl Into<String>) {
        self.joins.push(join.into());
    }

    pub fn push_column(&mut self, column: impl Into<String>) {
        self.columns.push(column.into());
    }

    pub fn push_order(&mut self, column: impl Into<String>, direction: impl Into<String>) {
        self.orders.push((column.into(), direction.into()));
    }

    pub fn push_group(&mut self, column: impl Into<String>) {
        self.groups.push(column.into());
    }

    pub fn set_limit(&mut self, limit: Option<u64>) {
        self.limit = limit;
    }

    pub fn set_offset(&mut self, offset: Option<u64>) {
        self.offset = offset;
    }

    /// Start a new insert row. Values pushed afterwards land in it.
    pub fn start_row(&mut self) {
        self.rows.push(Vec::new());
    }

    /// Add a column to the current insert row, replacing an earlier value for
    /// the same column in place.
    pub fn push_value(&mut self, column: impl Into<String>, value: Value) {
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        if let Some(row) = self.rows.last_mut() {
            upsert(row, column.into(), value);
        }
    }

    /// Add a column assignment to an update, replacing an earlier value for
    /// the same column in place.
    pub fn push_set(&mut self, column: impl Into<String>, value: Value) {
        upsert(&mut self.sets, column.into(), value);
    }

    /// Render the accumulated clauses into [`sql`](Self::sql).
    ///
    /// Re-running re-renders from the current clauses. An update without a
    /// where clause or without any assignment is rejected before any SQL is
    /// produced.
    pub fn finish(&mut self) -> DbResult<&mut Self> {
        self.sql = match self.kind {
            StatementKind::Select => self.render_select(),
            StatementKind::Insert => self.render_insert("INSERT"),
            StatementKind::Replace => self.render_insert("REPLACE"),
            StatementKind::Update => self.render_update()?,
            StatementKind::Delete => format!("DELETE FROM {}{};", self.table, self.where_sql()),
        };
        Ok(self)
    }

    fn render_select(&self) -> String {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        let mut sql = format!("SELECT {} FROM {}", columns, self.table);
        if !self.joins.is_empty() {
            sql.push(' ');
            sql.push_str(&self.joins.join(" "));
        }
        sql.push_str(&self.where_sql());
        if !self.groups.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.groups.join(", "));
        }
        if !self.orders.is_empty() {
            let orders: Vec<String> = self
                .orders
                .iter()
                .map(|(column, direction)| order_term(column, direction))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&orders.join(", "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        sql.push(';');
        sql
    }

    fn render_insert(&self, verb: &str) -> String {
        let columns: Vec<&str> = self
            .rows
            .first()
            .map(|row| row.iter().map(|(c, _)| c.as_str()).collect())
            .unwrap_or_default();

        let groups: Vec<String> = if self.rows.is_empty() {
            vec!["()".to_string()]
        } else {
            self.rows
                .iter()
                .map(|row| {
                    let values: Vec<String> = columns
                        .iter()
                        .map(|c| {
                            row.iter()
                                .find(|(name, _)| name == c)
                                .map(|(_, v)| escape::escape(v))
                                .unwrap_or_else(|| "NULL".to_string())
                        })
                        .collect();
                    format!("({})", values.join(", "))
                })
                .collect()
        };

        format!(
            "{} INTO {} ({}) VALUES{};",
            verb,
            self.table,
            columns.join(", "),
            groups.join(", ")
        )
    }

    fn render_update(&self) -> DbResult<String> {
        if self.sets.is_empty() {
            return Err(DbError::invalid_statement(format!(
                "update of {} has no values to set",
                self.table
            )));
        }
        if self.wheres.is_empty() {
            return Err(DbError::invalid_statement(format!(
                "update of {} requires a where clause",
                self.table
            )));
        }
        let sets: Vec<String> = self
            .sets
            .iter()
            .map(|(column, value)| format!("{}={}", column, escape::escape(value)))
            .collect();
        Ok(format!(
            "UPDATE {} set {}{};",
            self.table,
            sets.join(", "),
            self.where_sql()
        ))
    }

    fn where_sql(&self) -> String {
        if self.wheres.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = self.wheres.iter().map(WhereClause::render).collect();
        format!(" WHERE {}", parts.join(" AND "))
    }
}

fn upsert(pairs: &mut Vec<(String, Value)>, column: String, value: Value) {
    match pairs.iter_mut().find(|(c, _)| *c == column) {
        Some(slot) => slot.1 = value,
        None => pairs.push((column, value)),
    }
}

// Directions other than asc/desc leave the bare column.
fn order_term(column: &str, direction: &str) -> String {
    if direction.eq_ignore_ascii_case("asc") || direction.eq_ignore_ascii_case("desc") {
        format!("{} {}", column, direction.to_ascii_uppercase())
    } else {
        column.to_string()
    }
}
