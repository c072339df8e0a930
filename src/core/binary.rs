//! Binary row form.
//!
//! Fields are written in declared column order, big-endian: integers as 8-byte
//! signed, floats as 8-byte IEEE 754, text as a 4-byte signed length followed
//! by UTF-8 bytes. A null text value is written with length 0; on decode,
//! length 0 becomes null when the column's NA is null and `""` otherwise.

use crate::core::error::KbError;
use crate::core::row::Row;
use crate::core::schema::{ColumnKind, Na, TableSchema};
use crate::core::value::Value;
use std::io::{ErrorKind, Read, Write};

pub fn encode(row: &Row) -> Vec<u8> {
    let mut buf = Vec::with_capacity(row.schema().max_bytes());
    encode_into(row, &mut buf);
    buf
}

pub fn encode_into(row: &Row, buf: &mut Vec<u8>) {
    for value in row.values() {
        match value {
            Value::Integer(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Value::Float(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Value::Text(s) => {
                buf.extend_from_slice(&(s.len() as i32).to_be_bytes());
                buf.extend_from_slice(s.as_bytes());
            }
            Value::Null => buf.extend_from_slice(&0i32.to_be_bytes()),
            // rows never hold timestamps; lddate is appended outside the row
            Value::Timestamp(_) => {}
        }
    }
}

pub fn write_row<W: Write>(writer: &mut W, row: &Row) -> Result<(), KbError> {
    writer.write_all(&encode(row))?;
    Ok(())
}

/// Decodes one row from the front of `input`, advancing it past the record.
pub fn decode(schema: &'static TableSchema, input: &mut &[u8]) -> Result<Row, KbError> {
    match read_row(input, schema)? {
        Some(row) => Ok(row),
        None => Err(truncated(schema)),
    }
}

/// Reads the next row; `Ok(None)` at a clean end of stream.
pub fn read_row<R: Read>(
    reader: &mut R,
    schema: &'static TableSchema,
) -> Result<Option<Row>, KbError> {
    let mut row = Row::new(schema);
    for (pos, column) in schema.columns.iter().enumerate() {
        let value = match column.kind {
            ColumnKind::Integer { .. } => {
                let mut bytes = [0u8; 8];
                if !fill(reader, &mut bytes, pos == 0, schema)? {
                    return Ok(None);
                }
                Value::Integer(i64::from_be_bytes(bytes))
            }
            ColumnKind::Float { .. } => {
                let mut bytes = [0u8; 8];
                if !fill(reader, &mut bytes, pos == 0, schema)? {
                    return Ok(None);
                }
                Value::Float(f64::from_be_bytes(bytes))
            }
            ColumnKind::Text { max_len } => {
                let mut bytes = [0u8; 4];
                if !fill(reader, &mut bytes, pos == 0, schema)? {
                    return Ok(None);
                }
                let len = i32::from_be_bytes(bytes);
                if len < 0 || len as usize > max_len.saturating_mul(4) {
                    return Err(KbError::ParseError(format!(
                        "{}.{}: invalid string length {}",
                        schema.name, column.name, len
                    )));
                }
                if len == 0 {
                    match column.na {
                        Na::Null => Value::Null,
                        _ => Value::Text(String::new()),
                    }
                } else {
                    let mut text = vec![0u8; len as usize];
                    fill(reader, &mut text, false, schema)?;
                    let text = String::from_utf8(text).map_err(|e| {
                        KbError::ParseError(format!(
                            "{}.{}: invalid UTF-8 in string field: {}",
                            schema.name, column.name, e
                        ))
                    })?;
                    Value::Text(text)
                }
            }
        };
        row.set_at(pos, value)?;
    }
    Ok(Some(row))
}

/// Reads rows until the stream ends at a record boundary.
pub fn read_rows<R: Read>(reader: &mut R, schema: &'static TableSchema) -> Result<Vec<Row>, KbError> {
    let mut rows = Vec::new();
    while let Some(row) = read_row(reader, schema)? {
        rows.push(row);
    }
    Ok(rows)
}

/// Fills `buf`. Returns false only when `at_start` and the stream is already
/// exhausted; a partial record is an error.
fn fill<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    at_start: bool,
    schema: &TableSchema,
) -> Result<bool, KbError> {
    let mut read = 0;
    while read < buf.len() {
        match reader.read(&mut buf[read..]) {
            Ok(0) if at_start && read == 0 => return Ok(false),
            Ok(0) => return Err(truncated(schema)),
            Ok(n) => read += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(KbError::IoError(e)),
        }
    }
    Ok(true)
}

fn truncated(schema: &TableSchema) -> KbError {
    KbError::ParseError(format!("truncated binary record for {}", schema.name))
}
