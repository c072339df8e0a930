use rusqlite;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KbError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    /// Unknown table/column name, missing mandatory column, or a value of the wrong kind.
    #[error("Schema error: {0}")]
    SchemaError(String),
    /// Wrong token count, unconvertible token, or a truncated binary record.
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Integer at or above its decimal-width ceiling, or text longer than its column.
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// A failed execute/commit, with the offending statement attached.
    #[error("Database error: {source}\n{statement}")]
    DatabaseError {
        statement: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Config error: {0}")]
    ConfigError(String),
}

impl KbError {
    pub(crate) fn database(statement: impl Into<String>, source: rusqlite::Error) -> Self {
        KbError::DatabaseError {
            statement: statement.into(),
            source,
        }
    }
}
