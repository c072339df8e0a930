//! SQL text for the row tables: DDL scripts and insert statements.

use crate::core::error::KbError;
use crate::core::row::Row;
use crate::core::schema::{ColumnKind, TableSchema};
use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Portable ANSI-style types with separate constraint and grant statements.
    Generic,
    #[default]
    Sqlite,
}

impl FromStr for Dialect {
    type Err = KbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(Dialect::Generic),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(KbError::ConfigError(format!(
                "unknown SQL dialect \"{}\" (expected generic or sqlite)",
                other
            ))),
        }
    }
}

/// Last `.`-separated segment of a table name; prefix of constraint names.
pub fn constraint_base(table: &str) -> &str {
    table.rsplit('.').next().unwrap_or(table)
}

pub fn column_type(kind: ColumnKind, dialect: Dialect) -> String {
    match (dialect, kind) {
        (Dialect::Generic, ColumnKind::Integer { digits }) => format!("NUMERIC({})", digits),
        (Dialect::Generic, ColumnKind::Float { bits }) => format!("FLOAT({})", bits),
        (Dialect::Generic, ColumnKind::Text { max_len }) => format!("VARCHAR({})", max_len),
        (Dialect::Sqlite, ColumnKind::Integer { .. }) => "INTEGER".to_string(),
        (Dialect::Sqlite, ColumnKind::Float { .. }) => "REAL".to_string(),
        (Dialect::Sqlite, ColumnKind::Text { .. }) => "TEXT".to_string(),
    }
}

/// Statements that create `table` with the columns of `schema`, in execution order.
pub fn create_table_script(
    schema: &TableSchema,
    table: &str,
    dialect: Dialect,
    include_pk: bool,
    include_uk: bool,
) -> Vec<String> {
    let base = constraint_base(table);
    let mut defs: Vec<String> = schema
        .columns
        .iter()
        .map(|c| {
            // sqlite stores NaN and null text as NULL
            let nullable = match (dialect, c.kind) {
                (Dialect::Sqlite, ColumnKind::Float { .. } | ColumnKind::Text { .. }) => true,
                _ => !c.required(),
            };
            format!(
                "{} {}{}",
                c.name,
                column_type(c.kind, dialect),
                if nullable { "" } else { " NOT NULL" }
            )
        })
        .collect();
    defs.push(match dialect {
        Dialect::Generic => "lddate TIMESTAMP NOT NULL".to_string(),
        Dialect::Sqlite => "lddate TEXT NOT NULL".to_string(),
    });

    let pk = (include_pk && !schema.primary_key.is_empty())
        .then(|| format!("CONSTRAINT {}_pk PRIMARY KEY ({})", base, schema.primary_key.join(", ")));
    let uk = (include_uk && !schema.unique_key.is_empty())
        .then(|| format!("CONSTRAINT {}_uk UNIQUE ({})", base, schema.unique_key.join(", ")));

    let mut script = Vec::new();
    match dialect {
        Dialect::Sqlite => {
            defs.extend(pk);
            defs.extend(uk);
            script.push(format!("CREATE TABLE {} (\n  {}\n)", table, defs.join(",\n  ")));
        }
        Dialect::Generic => {
            script.push(format!("CREATE TABLE {} (\n  {}\n)", table, defs.join(",\n  ")));
            for constraint in pk.into_iter().chain(uk) {
                script.push(format!("ALTER TABLE {} ADD {}", table, constraint));
            }
            script.push(format!("GRANT SELECT ON {} TO PUBLIC", table));
        }
    }
    script
}

/// SQL literal for one value; `'` is doubled inside strings.
pub fn literal(value: &Value) -> String {
    match value {
        Value::Integer(v) => v.to_string(),
        Value::Float(v) if v.is_finite() => format!("{:?}", v),
        Value::Float(_) | Value::Null => "NULL".to_string(),
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Timestamp(t) => format!("'{}'", t.format(crate::core::value::LDDATE_FORMAT)),
    }
}

/// Literal insert statement for one row, stamping lddate with the current time.
pub fn insert_sql(row: &Row, table: &str) -> String {
    let values: Vec<String> = row.values().iter().map(literal).collect();
    format!(
        "INSERT INTO {} ({}, lddate) VALUES ({}, CURRENT_TIMESTAMP)",
        table,
        row.schema().column_names().join(", "),
        values.join(", ")
    )
}

/// Parameterized insert binding every column plus lddate positionally.
pub fn insert_placeholders(schema: &TableSchema, table: &str) -> String {
    let params: Vec<String> = (1..=schema.len() + 1).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}, lddate) VALUES ({})",
        table,
        schema.column_names().join(", "),
        params.join(", ")
    )
}

/// Select of every column in declared order, lddate last.
pub fn select_all(schema: &TableSchema, table: &str) -> String {
    format!(
        "SELECT {}, lddate FROM {}",
        schema.column_names().join(", "),
        table
    )
}
