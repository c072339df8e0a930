//! Column descriptors and per-table schema metadata.
//!
//! Every table in the catalog is a `TableSchema`: an ordered list of typed
//! columns, each carrying its storage width, print format and NA sentinel,
//! plus the primary/unique key column sets. Everything else in the crate
//! (text, binary, SQL, database I/O) is driven from this description.

use crate::core::error::KbError;
use crate::core::value::Value;

/// Storage class of a column, with the width declared by the legacy schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `number(digits)`: values must stay below `10^digits`.
    Integer { digits: u32 },
    /// `float(bits)`: 24 or 53 bit mantissa. Always held as `f64`.
    Float { bits: u32 },
    /// `varchar2(max_len)`, measured in characters.
    Text { max_len: usize },
}

impl ColumnKind {
    /// Exclusive upper bound for integer columns.
    pub fn ceiling(&self) -> Option<i64> {
        match self {
            ColumnKind::Integer { digits } => 10i64.checked_pow(*digits),
            _ => None,
        }
    }

    /// Type spelling of the legacy schema, e.g. `number(9)`.
    pub fn legacy_type(&self) -> String {
        match self {
            ColumnKind::Integer { digits } => format!("number({})", digits),
            ColumnKind::Float { bits } => format!("float({})", bits),
            ColumnKind::Text { max_len } => format!("varchar2({})", max_len),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Integer { .. } => "integer",
            ColumnKind::Float { .. } => "float",
            ColumnKind::Text { .. } => "text",
        }
    }
}

/// Print format of a column in the text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `%d`
    Int,
    /// `%s`
    Str,
    /// `%1.<precision>f`
    Fixed { precision: usize },
    /// `%<width>.<precision>e`, exponent rendered as `e+NN`.
    Exp { width: usize, precision: usize },
}

impl Format {
    pub fn printf(&self) -> String {
        match self {
            Format::Int => "%d".to_string(),
            Format::Str => "%s".to_string(),
            Format::Fixed { precision } => format!("%1.{}f", precision),
            Format::Exp { width, precision } => format!("%{}.{}e", width, precision),
        }
    }
}

/// Declared "not applicable" sentinel of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Na {
    Int(i64),
    Float(f64),
    Text(&'static str),
    /// Text column whose NA is the absence of a value.
    Null,
}

impl Na {
    pub fn value(&self) -> Value {
        match self {
            Na::Int(v) => Value::Integer(*v),
            Na::Float(v) => Value::Float(*v),
            Na::Text(s) => Value::Text((*s).to_string()),
            Na::Null => Value::Null,
        }
    }

    /// True when the sentinel only marks "no value"; such columns must be
    /// supplied by any reordered input column list.
    pub fn is_placeholder(&self) -> bool {
        match self {
            Na::Int(v) => *v == i64::MIN,
            Na::Float(v) => v.is_nan(),
            Na::Text(_) => false,
            Na::Null => true,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Na::Int(i64::MIN) => "Long.MIN_VALUE".to_string(),
            Na::Int(v) => v.to_string(),
            Na::Float(v) if v.is_nan() => "NaN".to_string(),
            Na::Float(v) => v.to_string(),
            Na::Text(s) => format!("\"{}\"", s),
            Na::Null => "null".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub format: Format,
    pub na: Na,
    pub description: &'static str,
}

impl Column {
    pub const fn int(name: &'static str, digits: u32) -> Self {
        Column {
            name,
            kind: ColumnKind::Integer { digits },
            format: Format::Int,
            na: Na::Int(i64::MIN),
            description: "",
        }
    }

    pub const fn float(name: &'static str, bits: u32, format: Format) -> Self {
        Column {
            name,
            kind: ColumnKind::Float { bits },
            format,
            na: Na::Float(f64::NAN),
            description: "",
        }
    }

    pub const fn text(name: &'static str, max_len: usize) -> Self {
        Column {
            name,
            kind: ColumnKind::Text { max_len },
            format: Format::Str,
            na: Na::Null,
            description: "",
        }
    }

    pub const fn na(self, na: Na) -> Self {
        Column { na, ..self }
    }

    pub const fn about(self, description: &'static str) -> Self {
        Column {
            description,
            ..self
        }
    }

    pub fn required(&self) -> bool {
        self.na.is_placeholder()
    }
}

#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub columns: &'static [Column],
    pub primary_key: &'static [&'static str],
    pub unique_key: &'static [&'static str],
}

/// Validated list of column positions used to read or write the text form.
///
/// Passed explicitly to every text operation; there is no table-wide
/// "current" order to save and restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOrder {
    positions: Vec<usize>,
}

impl ColumnOrder {
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn names(&self, schema: &TableSchema) -> Vec<&'static str> {
        self.positions
            .iter()
            .map(|&p| schema.columns[p].name)
            .collect()
    }
}

impl TableSchema {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Case-insensitive column lookup.
    pub fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column(&self, name: &str) -> Result<(usize, &'static Column), KbError> {
        let columns: &'static [Column] = self.columns;
        match self.position(name) {
            Some(pos) => Ok((pos, &columns[pos])),
            None => Err(KbError::SchemaError(format!(
                "{}: field \"{}\" is not a valid column name",
                self.name, name
            ))),
        }
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn required_columns(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.required())
            .map(|c| c.name)
            .collect()
    }

    /// Fails on the first name that is not a column of this table.
    pub fn validate_names<S: AsRef<str>>(&self, names: &[S]) -> Result<(), KbError> {
        for name in names {
            self.column(name.as_ref())?;
        }
        Ok(())
    }

    /// Fails when a mandatory column is absent from `names`.
    pub fn validate_required<S: AsRef<str>>(&self, names: &[S]) -> Result<(), KbError> {
        let missing: Vec<&str> = self
            .required_columns()
            .into_iter()
            .filter(|req| !names.iter().any(|n| n.as_ref().trim().eq_ignore_ascii_case(req)))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(KbError::SchemaError(format!(
                "{}: input column names [{}] do not contain required column(s) [{}]",
                self.name,
                names
                    .iter()
                    .map(|n| n.as_ref())
                    .collect::<Vec<_>>()
                    .join(", "),
                missing.join(", ")
            )))
        }
    }

    pub fn default_order(&self) -> ColumnOrder {
        ColumnOrder {
            positions: (0..self.columns.len()).collect(),
        }
    }

    /// Order for reading: every name must be known and every mandatory column present.
    pub fn input_order<S: AsRef<str>>(&self, names: &[S]) -> Result<ColumnOrder, KbError> {
        self.validate_names(names)?;
        self.validate_required(names)?;
        self.positions_of(names)
    }

    /// Order for writing: any subset of known columns.
    pub fn output_order<S: AsRef<str>>(&self, names: &[S]) -> Result<ColumnOrder, KbError> {
        self.validate_names(names)?;
        self.positions_of(names)
    }

    fn positions_of<S: AsRef<str>>(&self, names: &[S]) -> Result<ColumnOrder, KbError> {
        let positions = names
            .iter()
            .map(|n| self.column(n.as_ref()).map(|(pos, _)| pos))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ColumnOrder { positions })
    }

    pub fn primary_key_positions(&self) -> Vec<usize> {
        self.key_positions(self.primary_key)
    }

    pub fn unique_key_positions(&self) -> Vec<usize> {
        self.key_positions(self.unique_key)
    }

    fn key_positions(&self, key: &[&str]) -> Vec<usize> {
        key.iter().filter_map(|name| self.position(name)).collect()
    }

    pub fn in_primary_key(&self, name: &str) -> bool {
        self.primary_key.iter().any(|k| k.eq_ignore_ascii_case(name))
    }

    pub fn in_unique_key(&self, name: &str) -> bool {
        self.unique_key.iter().any(|k| k.eq_ignore_ascii_case(name))
    }

    /// Upper bound on the binary size of one row.
    pub fn max_bytes(&self) -> usize {
        self.columns
            .iter()
            .map(|c| match c.kind {
                ColumnKind::Integer { .. } | ColumnKind::Float { .. } => 8,
                ColumnKind::Text { max_len } => 4 + max_len,
            })
            .sum()
    }
}
