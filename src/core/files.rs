//! Batch reading and writing of whole files of rows.

use crate::core::binary;
use crate::core::error::KbError;
use crate::core::row::Row;
use crate::core::schema::{ColumnOrder, TableSchema};
use crate::core::text::{self, TextOptions};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Reads text rows. `order` defaults to the declared column order; a `#`
/// header on the first line replaces it for this call only. Later `#` lines
/// and blank lines are skipped.
pub fn read_rows<R: BufRead>(
    reader: R,
    schema: &'static TableSchema,
    order: Option<&ColumnOrder>,
    opts: &TextOptions,
) -> Result<Vec<Row>, KbError> {
    let mut order = order.cloned().unwrap_or_else(|| schema.default_order());
    let mut rows = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            if line_no == 1 {
                let names = text::parse_header(line);
                order = schema.input_order(&names).map_err(|e| at_line(line_no, e))?;
            }
            continue;
        }
        let row = text::parse_line(schema, &order, line, opts).map_err(|e| at_line(line_no, e))?;
        rows.push(row);
    }
    Ok(rows)
}

fn at_line(line_no: usize, err: KbError) -> KbError {
    match err {
        KbError::SchemaError(msg) => KbError::SchemaError(format!("line {}: {}", line_no, msg)),
        KbError::ParseError(msg) => KbError::ParseError(format!("line {}: {}", line_no, msg)),
        KbError::ValidationError(msg) => {
            KbError::ValidationError(format!("line {}: {}", line_no, msg))
        }
        other => other,
    }
}

pub fn read_file(
    path: &Path,
    schema: &'static TableSchema,
    order: Option<&ColumnOrder>,
    opts: &TextOptions,
) -> Result<Vec<Row>, KbError> {
    let file = File::open(path)?;
    read_rows(BufReader::new(file), schema, order, opts)
}

/// Writes an optional header line, then one line per row.
pub fn write_rows<W: Write>(
    writer: &mut W,
    schema: &TableSchema,
    rows: &[Row],
    order: &ColumnOrder,
    opts: &TextOptions,
    header: bool,
) -> Result<(), KbError> {
    if header {
        writeln!(writer, "{}", text::header_line(schema, order, opts))?;
    }
    for row in rows {
        writeln!(writer, "{}", text::render_line(row, order, opts))?;
    }
    Ok(())
}

pub fn write_file(
    path: &Path,
    schema: &TableSchema,
    rows: &[Row],
    order: &ColumnOrder,
    opts: &TextOptions,
    header: bool,
) -> Result<(), KbError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_rows(&mut writer, schema, rows, order, opts, header)?;
    writer.flush()?;
    Ok(())
}

pub fn read_binary_file(path: &Path, schema: &'static TableSchema) -> Result<Vec<Row>, KbError> {
    let mut reader = BufReader::new(File::open(path)?);
    binary::read_rows(&mut reader, schema)
}

pub fn write_binary_file(path: &Path, rows: &[Row]) -> Result<(), KbError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for row in rows {
        binary::write_row(&mut writer, row)?;
    }
    writer.flush()?;
    Ok(())
}
