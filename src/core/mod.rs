//! Row machinery for the NNSA KB Custom tables.
//!
//! `schema` and `catalog` describe the tables, `row` holds values, and the
//! codecs (`text`, `binary`, `sql`) plus the I/O layers (`files`, `db`) are all
//! driven from the static descriptors. `config`, `broker` and `time` carry the
//! CLI settings and audit trail.

pub mod binary;
pub mod broker;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod files;
pub mod row;
pub mod schema;
pub mod sql;
pub mod text;
pub mod time;
pub mod value;
