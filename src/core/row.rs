//! The generic table row.
//!
//! A `Row` pairs a static table descriptor with one value per column. Every
//! write path (constructors, setters, decoders) goes through `validate`, so a
//! row never holds a value its column could not store.

use crate::core::binary;
use crate::core::error::KbError;
use crate::core::schema::{Column, ColumnKind, TableSchema};
use crate::core::text;
use crate::core::value::Value;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct Row {
    schema: &'static TableSchema,
    values: Vec<Value>,
}

/// Checks kind, integer ceiling and text length of `value` against `column`.
pub fn validate(column: &Column, value: &Value) -> Result<(), KbError> {
    match (column.kind, value) {
        (ColumnKind::Integer { digits }, Value::Integer(v)) => {
            if let Some(ceiling) = column.kind.ceiling() {
                if *v >= ceiling {
                    return Err(KbError::ValidationError(format!(
                        "{}={} but cannot be >= {} (number({}))",
                        column.name, v, ceiling, digits
                    )));
                }
            }
            Ok(())
        }
        (ColumnKind::Float { .. }, Value::Float(_)) => Ok(()),
        (ColumnKind::Text { max_len }, Value::Text(s)) => {
            let len = s.chars().count();
            if len > max_len {
                return Err(KbError::ValidationError(format!(
                    "{} length {} cannot be > {}: {}",
                    column.name, len, max_len, s
                )));
            }
            Ok(())
        }
        (ColumnKind::Text { .. }, Value::Null) => Ok(()),
        (kind, value) => Err(KbError::SchemaError(format!(
            "{} is a {} column and cannot hold a {} value",
            column.name,
            kind.name(),
            value.kind_name()
        ))),
    }
}

impl Row {
    /// A row with every column at its NA value.
    pub fn new(schema: &'static TableSchema) -> Self {
        Row {
            schema,
            values: schema.columns.iter().map(|c| c.na.value()).collect(),
        }
    }

    /// A row from values in declared column order.
    pub fn from_values(schema: &'static TableSchema, values: Vec<Value>) -> Result<Self, KbError> {
        if values.len() != schema.columns.len() {
            return Err(KbError::SchemaError(format!(
                "{} has {} columns but {} values were supplied",
                schema.name,
                schema.columns.len(),
                values.len()
            )));
        }
        for (column, value) in schema.columns.iter().zip(values.iter()) {
            validate(column, value)?;
        }
        Ok(Row { schema, values })
    }

    pub fn schema(&self) -> &'static TableSchema {
        self.schema
    }

    pub fn table_name(&self) -> &'static str {
        self.schema.name
    }

    pub fn get(&self, name: &str) -> Result<&Value, KbError> {
        let (pos, _) = self.schema.column(name)?;
        Ok(&self.values[pos])
    }

    pub fn get_int(&self, name: &str) -> Result<i64, KbError> {
        let value = self.get(name)?;
        value.as_i64().ok_or_else(|| self.wrong_kind(name, "integer", value))
    }

    pub fn get_float(&self, name: &str) -> Result<f64, KbError> {
        let value = self.get(name)?;
        value.as_f64().ok_or_else(|| self.wrong_kind(name, "float", value))
    }

    /// `None` when the column holds its null NA.
    pub fn get_text(&self, name: &str) -> Result<Option<&str>, KbError> {
        match self.get(name)? {
            Value::Text(s) => Ok(Some(s.as_str())),
            Value::Null => Ok(None),
            other => Err(self.wrong_kind(name, "text", other)),
        }
    }

    fn wrong_kind(&self, name: &str, wanted: &str, found: &Value) -> KbError {
        KbError::SchemaError(format!(
            "{}.{} holds a {} value, not {}",
            self.schema.name,
            name,
            found.kind_name(),
            wanted
        ))
    }

    pub fn value_at(&self, pos: usize) -> Option<&Value> {
        self.values.get(pos)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, KbError> {
        let (pos, _) = self.schema.column(name)?;
        self.set_at(pos, value.into())?;
        Ok(self)
    }

    pub fn set_int(&mut self, name: &str, value: i64) -> Result<&mut Self, KbError> {
        self.set(name, Value::Integer(value))
    }

    pub fn set_float(&mut self, name: &str, value: f64) -> Result<&mut Self, KbError> {
        self.set(name, Value::Float(value))
    }

    pub fn set_text(&mut self, name: &str, value: impl Into<String>) -> Result<&mut Self, KbError> {
        self.set(name, Value::Text(value.into()))
    }

    /// Sets a column from one text-form token, converting by the column kind.
    pub fn set_token(&mut self, name: &str, token: &str) -> Result<&mut Self, KbError> {
        let (pos, column) = self.schema.column(name)?;
        let value = text::parse_value(self.schema, column, token, false)?;
        self.set_at(pos, value)?;
        Ok(self)
    }

    pub(crate) fn set_at(&mut self, pos: usize, value: Value) -> Result<(), KbError> {
        let column = self.schema.columns.get(pos).ok_or_else(|| {
            KbError::SchemaError(format!("{} has no column #{}", self.schema.name, pos))
        })?;
        validate(column, &value)?;
        self.values[pos] = value;
        Ok(())
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Positional values with the load date appended, as bound by database inserts.
    pub fn values_with_lddate(&self, lddate: DateTime<Utc>) -> Vec<Value> {
        let mut values = self.values.clone();
        values.push(Value::Timestamp(lddate));
        values
    }

    /// False when the tables differ or no primary key is declared.
    pub fn equal_primary_key(&self, other: &Row) -> bool {
        self.equal_on(other, &self.schema.primary_key_positions())
    }

    /// False when the tables differ or no unique key is declared.
    pub fn equal_unique_key(&self, other: &Row) -> bool {
        self.equal_on(other, &self.schema.unique_key_positions())
    }

    fn equal_on(&self, other: &Row, positions: &[usize]) -> bool {
        self.schema.name == other.schema.name
            && !positions.is_empty()
            && positions.iter().all(|&p| self.values[p] == other.values[p])
    }

    /// SHA-256 of the binary encoding, computed on every call.
    pub fn content_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.schema.name.as_bytes());
        hasher.update(binary::encode(self));
        hasher.finalize().into()
    }

    pub fn content_hash_hex(&self) -> String {
        self.content_hash()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name == other.schema.name && self.values == other.values
    }
}

impl Eq for Row {}

impl Hash for Row {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.schema.name.hash(state);
        self.values.hash(state);
    }
}

/// Text form in declared column order with default options.
impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = self.schema.default_order();
        f.write_str(&text::render_line(self, &order, &text::TextOptions::default()))
    }
}
