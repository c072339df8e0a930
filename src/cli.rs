//! CLI struct definitions for the kbrow command-line interface.
//!
//! All clap-derived types live here. Dispatch lives in `lib.rs`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "kbrow",
    version = env!("CARGO_PKG_VERSION"),
    about = "Read, write and load NNSA KB Custom table rows in text, binary and SQL form.",
    disable_version_flag = true
)]
pub(crate) struct Cli {
    /// Config file (default: ./kbrow.toml when present).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum RowForm {
    Text,
    Binary,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum DialectArg {
    Generic,
    Sqlite,
}

#[derive(clap::Args, Debug)]
pub(crate) struct TextArgs {
    /// Token delimiter: space, tab, comma or a single punctuation character.
    #[clap(long)]
    pub delimiter: Option<String>,
    /// Write floats in shortest exact form instead of the column format.
    #[clap(long)]
    pub exact_floats: bool,
    /// Comma-separated column names for reading or writing text rows.
    #[clap(long, value_delimiter = ',')]
    pub columns: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// List the tables of the catalog
    Tables {
        #[clap(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show the columns and keys of one table
    Describe {
        table: String,
        #[clap(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Print the create-table script of one table
    Ddl {
        table: String,
        /// Table name to create (default: the catalog name).
        #[clap(long)]
        name: Option<String>,
        #[clap(long, value_enum)]
        dialect: Option<DialectArg>,
        /// Leave out the primary key constraint.
        #[clap(long)]
        no_pk: bool,
        /// Leave out the unique key constraint.
        #[clap(long)]
        no_uk: bool,
    },
    /// Convert a file of rows between text and binary forms
    Convert {
        table: String,
        #[clap(long)]
        input: PathBuf,
        #[clap(long)]
        output: PathBuf,
        #[clap(long, value_enum, default_value = "text")]
        from: RowForm,
        #[clap(long, value_enum, default_value = "binary")]
        to: RowForm,
        #[clap(flatten)]
        text: TextArgs,
    },
    /// Insert rows from a file into a SQLite database
    Load {
        table: String,
        #[clap(long)]
        db: PathBuf,
        #[clap(long)]
        input: PathBuf,
        /// Database table name (default: the catalog name).
        #[clap(long)]
        name: Option<String>,
        #[clap(long, value_enum, default_value = "text")]
        from: RowForm,
        /// Create the table first.
        #[clap(long)]
        create: bool,
        #[clap(flatten)]
        text: TextArgs,
    },
    /// Write the rows of a SQLite table to stdout or a file
    Dump {
        table: String,
        #[clap(long)]
        db: PathBuf,
        /// Database table name (default: the catalog name).
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        output: Option<PathBuf>,
        #[clap(long, value_enum, default_value = "text")]
        to: RowForm,
        #[clap(flatten)]
        text: TextArgs,
    },
    /// Print the kbrow version
    Version,
}
