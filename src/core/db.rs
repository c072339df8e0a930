use crate::core::error::KbError;
use crate::core::row::Row;
use crate::core::schema::{ColumnKind, TableSchema};
use crate::core::sql::{self, Dialect};
use crate::core::value::Value;
use chrono::{DateTime, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, params_from_iter};

pub fn db_connect(db_path: &str) -> Result<Connection, KbError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(KbError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(KbError::RusqliteError)?;
    conn.execute("PRAGMA foreign_keys=ON;", [])
        .map_err(KbError::RusqliteError)?;
    Ok(conn)
}

/// Runs the SQLite create script for `schema` under the name `table`.
pub fn create_table(
    conn: &Connection,
    schema: &TableSchema,
    table: &str,
    include_pk: bool,
    include_uk: bool,
) -> Result<(), KbError> {
    for statement in sql::create_table_script(schema, table, Dialect::Sqlite, include_pk, include_uk) {
        conn.execute(&statement, [])
            .map_err(|e| KbError::database(statement.clone(), e))?;
    }
    Ok(())
}

/// Inserts `rows` into `table`, stamping each with `lddate`.
///
/// With `commit` the batch runs in its own transaction and is committed at
/// the end; a failure rolls the whole batch back. Without it the inserts join
/// whatever transaction the caller holds on `conn`. The error for a failed row
/// carries that row's literal insert statement.
pub fn write_rows(
    conn: &Connection,
    table: &str,
    rows: &[Row],
    lddate: DateTime<Utc>,
    commit: bool,
) -> Result<usize, KbError> {
    let Some(first) = rows.first() else {
        return Ok(0);
    };
    let schema = first.schema();
    let insert = sql::insert_placeholders(schema, table);

    let tx = if commit {
        Some(
            conn.unchecked_transaction()
                .map_err(|e| KbError::database("BEGIN", e))?,
        )
    } else {
        None
    };

    let mut stmt = conn
        .prepare(&insert)
        .map_err(|e| KbError::database(insert.clone(), e))?;
    for row in rows {
        if row.table_name() != schema.name {
            return Err(KbError::SchemaError(format!(
                "cannot write a {} row into a batch of {} rows",
                row.table_name(),
                schema.name
            )));
        }
        let values = row.values_with_lddate(lddate);
        stmt.execute(params_from_iter(values.iter()))
            .map_err(|e| KbError::database(sql::insert_sql(row, table), e))?;
    }
    drop(stmt);

    if let Some(tx) = tx {
        tx.commit().map_err(|e| KbError::database("COMMIT", e))?;
    }
    Ok(rows.len())
}

/// Runs `select` and maps every result row, reading column `i` of `schema`
/// from result position `offset + i`.
pub fn read_rows(
    conn: &Connection,
    schema: &'static TableSchema,
    select: &str,
    offset: usize,
) -> Result<Vec<Row>, KbError> {
    let wrap = |e: rusqlite::Error| KbError::database(select, e);
    let mut stmt = conn.prepare(select).map_err(wrap)?;
    let mut result = stmt.query([]).map_err(wrap)?;
    let mut rows = Vec::new();
    while let Some(sql_row) = result.next().map_err(wrap)? {
        rows.push(row_from_sql(schema, sql_row, offset).map_err(|e| match e {
            KbError::RusqliteError(source) => KbError::database(select, source),
            other => other,
        })?);
    }
    Ok(rows)
}

/// Builds a row from one result row. SQL NULL becomes the column's NA.
pub fn row_from_sql(
    schema: &'static TableSchema,
    sql_row: &rusqlite::Row<'_>,
    offset: usize,
) -> Result<Row, KbError> {
    let mut row = Row::new(schema);
    for (i, column) in schema.columns.iter().enumerate() {
        let raw = sql_row.get_ref(offset + i)?;
        let mismatch = || {
            KbError::SchemaError(format!(
                "{}.{}: cannot read a {} column from SQL type {}",
                schema.name,
                column.name,
                column.kind.name(),
                raw.data_type()
            ))
        };
        let utf8 = |bytes: &[u8]| -> Result<String, KbError> {
            std::str::from_utf8(bytes).map(str::to_string).map_err(|e| {
                KbError::ParseError(format!(
                    "{}.{}: invalid UTF-8 in string field: {}",
                    schema.name, column.name, e
                ))
            })
        };
        let value = match (column.kind, raw) {
            (_, ValueRef::Null) => column.na.value(),
            (ColumnKind::Integer { .. }, ValueRef::Integer(v)) => Value::Integer(v),
            (ColumnKind::Integer { .. }, ValueRef::Real(v)) if v.fract() == 0.0 => {
                Value::Integer(v as i64)
            }
            (ColumnKind::Float { .. }, ValueRef::Real(v)) => Value::Float(v),
            (ColumnKind::Float { .. }, ValueRef::Integer(v)) => Value::Float(v as f64),
            (ColumnKind::Text { .. }, ValueRef::Text(bytes)) => Value::Text(utf8(bytes)?),
            (ColumnKind::Text { .. }, ValueRef::Integer(v)) => Value::Text(v.to_string()),
            (ColumnKind::Text { .. }, ValueRef::Real(v)) => Value::Text(v.to_string()),
            (ColumnKind::Integer { .. } | ColumnKind::Float { .. }, ValueRef::Text(bytes)) => {
                let token = utf8(bytes)?;
                crate::core::text::parse_value(schema, column, token.trim(), false)
                    .map_err(|_| mismatch())?
            }
            _ => return Err(mismatch()),
        };
        row.set_at(i, value)?;
    }
    Ok(row)
}
