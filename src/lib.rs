//! kbrow: schema-driven rows for the NNSA KB Custom knowledge-base tables.
//!
//! Every table of the schema is described once, statically, in
//! [`core::catalog`]. A single generic [`core::row::Row`] type reads and writes
//! any of them in three forms:
//!
//! - **Text**: one row per line, delimiter-separated tokens, optional `#` header
//!   naming the columns ([`core::text`], [`core::files`]).
//! - **Binary**: big-endian fixed-order records ([`core::binary`]).
//! - **SQL**: DDL scripts and insert statements ([`core::sql`]) plus batch
//!   reads and writes over SQLite ([`core::db`]).
//!
//! Values are validated against their column on every path in: integers must
//! stay below `10^digits`, text must fit its declared width.
//!
//! # Examples
//!
//! ```bash
//! # What tables are there?
//! kbrow tables
//!
//! # Columns, NA values and keys of one table
//! kbrow describe box_smooth
//!
//! # Create script in the portable dialect
//! kbrow ddl box_smooth --dialect generic
//!
//! # Text file to SQLite, then back out again
//! kbrow load box_smooth --db kb.db --input box_smooth.txt --create
//! kbrow dump box_smooth --db kb.db --output copy.txt
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: schema, catalog, row, codecs, database access, config and audit

pub mod core;

mod cli;

use crate::core::broker::DbBroker;
use crate::core::config::{self, KbConfig};
use crate::core::error::KbError;
use crate::core::row::Row;
use crate::core::schema::{ColumnOrder, TableSchema};
use crate::core::sql::{self, Dialect};
use crate::core::text::{Delimiter, TextOptions};
use crate::core::{binary, catalog, db, files, time};
use clap::Parser;
use cli::{Cli, Command, DialectArg, OutputFormat, RowForm, TextArgs};
use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;

pub const KBROW_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() -> Result<(), KbError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;
    let config = config::load_config(cli.config.as_deref(), &current_dir)?;

    match cli.command {
        Command::Version => {
            println!("v{}", KBROW_VERSION);
            Ok(())
        }
        Command::Tables { format } => run_tables(format),
        Command::Describe { table, format } => run_describe(&table, format),
        Command::Ddl {
            table,
            name,
            dialect,
            no_pk,
            no_uk,
        } => {
            let schema = catalog::lookup(&table)?;
            let dialect = match dialect {
                Some(DialectArg::Generic) => Dialect::Generic,
                Some(DialectArg::Sqlite) => Dialect::Sqlite,
                None => config.sql.dialect,
            };
            let name = name.unwrap_or_else(|| schema.name.to_string());
            for statement in sql::create_table_script(schema, &name, dialect, !no_pk, !no_uk) {
                println!("{};", statement);
            }
            Ok(())
        }
        Command::Convert {
            table,
            input,
            output,
            from,
            to,
            text,
        } => {
            let schema = catalog::lookup(&table)?;
            let opts = text_options(&config, &text)?;
            let rows = read_input(schema, &input, from, &text, &opts)?;
            write_output(schema, &rows, Some(output.as_path()), to, &text, &opts, &config)?;
            eprintln!(
                "{} {} {} rows to {}",
                "converted".green().bold(),
                rows.len(),
                schema.name,
                output.display()
            );
            Ok(())
        }
        Command::Load {
            table,
            db: db_path,
            input,
            name,
            from,
            create,
            text,
        } => {
            let schema = catalog::lookup(&table)?;
            let opts = text_options(&config, &text)?;
            let rows = read_input(schema, &input, from, &text, &opts)?;
            let name = name.unwrap_or_else(|| schema.name.to_string());
            let broker = broker(&config, &current_dir);
            let written = broker.with_conn(&db_path, "load", &name, |conn| {
                if create {
                    db::create_table(conn, schema, &name, true, true)?;
                }
                db::write_rows(conn, &name, &rows, time::lddate_now(), true)
            })?;
            eprintln!(
                "{} {} rows into {} ({})",
                "loaded".green().bold(),
                written,
                name,
                db_path.display()
            );
            Ok(())
        }
        Command::Dump {
            table,
            db: db_path,
            name,
            output,
            to,
            text,
        } => {
            let schema = catalog::lookup(&table)?;
            let opts = text_options(&config, &text)?;
            let name = name.unwrap_or_else(|| schema.name.to_string());
            let broker = broker(&config, &current_dir);
            let select = sql::select_all(schema, &name);
            let rows = broker.with_conn(&db_path, "dump", &name, |conn| {
                db::read_rows(conn, schema, &select, 0)
            })?;
            write_output(schema, &rows, output.as_deref(), to, &text, &opts, &config)
        }
    }
}

fn broker(config: &KbConfig, base: &Path) -> DbBroker {
    DbBroker::new(config.audit_log_path(base), config.audit.actor.clone())
}

/// Config text settings with command-line overrides applied.
fn text_options(config: &KbConfig, args: &TextArgs) -> Result<TextOptions, KbError> {
    let mut opts = config.text_options()?;
    if let Some(delimiter) = &args.delimiter {
        opts.delimiter = Delimiter::parse(delimiter)?;
    }
    opts.exact_floats |= args.exact_floats;
    Ok(opts)
}

fn read_input(
    schema: &'static TableSchema,
    input: &Path,
    form: RowForm,
    args: &TextArgs,
    opts: &TextOptions,
) -> Result<Vec<Row>, KbError> {
    match form {
        RowForm::Binary => files::read_binary_file(input, schema),
        RowForm::Text => {
            let order = if args.columns.is_empty() {
                None
            } else {
                Some(schema.input_order(&args.columns)?)
            };
            files::read_file(input, schema, order.as_ref(), opts)
        }
    }
}

fn write_output(
    schema: &'static TableSchema,
    rows: &[Row],
    output: Option<&Path>,
    form: RowForm,
    args: &TextArgs,
    opts: &TextOptions,
    config: &KbConfig,
) -> Result<(), KbError> {
    let order: ColumnOrder = if args.columns.is_empty() {
        schema.default_order()
    } else {
        schema.output_order(&args.columns)?
    };
    match (form, output) {
        (RowForm::Text, Some(path)) => {
            files::write_file(path, schema, rows, &order, opts, config.text.header)
        }
        (RowForm::Text, None) => {
            let mut out = io::stdout().lock();
            files::write_rows(&mut out, schema, rows, &order, opts, config.text.header)?;
            out.flush()?;
            Ok(())
        }
        (RowForm::Binary, Some(path)) => files::write_binary_file(path, rows),
        (RowForm::Binary, None) => {
            let mut out = io::stdout().lock();
            for row in rows {
                binary::write_row(&mut out, row)?;
            }
            out.flush()?;
            Ok(())
        }
    }
}

fn run_tables(format: OutputFormat) -> Result<(), KbError> {
    match format {
        OutputFormat::Json => {
            let tables: Vec<serde_json::Value> = catalog::all()
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "name": s.name,
                        "description": s.description,
                        "columns": s.len(),
                    })
                })
                .collect();
            let envelope = time::json_envelope(
                "tables",
                "ok",
                serde_json::json!({ "schema": catalog::SCHEMA_NAME, "tables": tables }),
            );
            println!("{}", envelope);
        }
        OutputFormat::Text => {
            println!("{}", catalog::SCHEMA_NAME.bold());
            for schema in catalog::all() {
                println!(
                    "  {:<22} {:>3} cols  {}",
                    schema.name.cyan(),
                    schema.len(),
                    schema.description
                );
            }
        }
    }
    Ok(())
}

fn run_describe(table: &str, format: OutputFormat) -> Result<(), KbError> {
    let schema = catalog::lookup(table)?;
    match format {
        OutputFormat::Json => {
            let columns: Vec<serde_json::Value> = schema
                .columns
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "name": c.name,
                        "type": c.kind.legacy_type(),
                        "format": c.format.printf(),
                        "na": c.na.describe(),
                        "required": c.required(),
                        "primary_key": schema.in_primary_key(c.name),
                        "unique_key": schema.in_unique_key(c.name),
                        "description": c.description,
                    })
                })
                .collect();
            let envelope = time::json_envelope(
                "describe",
                "ok",
                serde_json::json!({
                    "table": schema.name,
                    "description": schema.description,
                    "primary_key": schema.primary_key,
                    "unique_key": schema.unique_key,
                    "max_bytes": schema.max_bytes(),
                    "columns": columns,
                }),
            );
            println!("{}", envelope);
        }
        OutputFormat::Text => {
            println!("{}  {}", schema.name.bold(), schema.description);
            for c in schema.columns {
                let mut flags = Vec::new();
                if schema.in_primary_key(c.name) {
                    flags.push("pk");
                }
                if schema.in_unique_key(c.name) {
                    flags.push("uk");
                }
                if c.required() {
                    flags.push("required");
                }
                println!(
                    "  {:<18} {:<15} {:<8} na={:<15} {}",
                    c.name.cyan(),
                    c.kind.legacy_type(),
                    c.format.printf(),
                    c.na.describe(),
                    flags.join(",").yellow()
                );
            }
            println!("  max record size: {} bytes", schema.max_bytes());
        }
    }
    Ok(())
}
