use crate::core::schema::Format;
use chrono::{DateTime, Utc};
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use std::fmt;
use std::hash::{Hash, Hasher};

pub const LDDATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One field of a row.
///
/// Floats compare bit-for-bit, with every NaN equal to every other NaN, so
/// NA-filled rows compare equal to themselves.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
    /// Load date appended to positional value arrays and database inserts.
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Null => "null",
            Value::Timestamp(_) => "timestamp",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Renders the value with a column print format. Text is returned raw;
    /// quoting belongs to the text codec.
    pub fn render(&self, format: Format, exact_floats: bool) -> String {
        match self {
            Value::Integer(v) => v.to_string(),
            Value::Float(v) if exact_floats => format!("{:?}", v),
            Value::Float(v) => format_float(*v, format),
            Value::Text(s) => s.clone(),
            Value::Null => "null".to_string(),
            Value::Timestamp(t) => t.format(LDDATE_FORMAT).to_string(),
        }
    }
}

pub fn format_float(v: f64, format: Format) -> String {
    match format {
        Format::Fixed { precision } => format!("{:.*}", precision, v),
        Format::Exp { width, precision } => format_exp(v, width, precision),
        Format::Int | Format::Str => format!("{:?}", v),
    }
}

/// C-style `%W.Pe`: mantissa with `precision` decimals and a signed,
/// at-least-two-digit exponent, right aligned to `width`.
pub fn format_exp(v: f64, width: usize, precision: usize) -> String {
    let body = if v.is_finite() {
        let raw = format!("{:.*e}", precision, v);
        match raw.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().unwrap_or(0);
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exp.abs())
            }
            None => raw,
        }
    } else {
        format!("{:?}", v)
    };
    format!("{:>width$}", body, width = width)
}

fn float_eq(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => float_eq(*a, *b),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Integer(v) => v.hash(state),
            Value::Float(v) if v.is_nan() => f64::NAN.to_bits().hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Null => {}
            Value::Timestamp(t) => t.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{:?}", v),
            other => f.write_str(&other.render(Format::Str, true)),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Option<&str>> for Value {
    fn from(v: Option<&str>) -> Self {
        v.map_or(Value::Null, Value::from)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

/// NaN has no SQL spelling; it binds as NULL.
impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Integer(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            Value::Float(v) if v.is_nan() => ToSqlOutput::Owned(SqlValue::Null),
            Value::Float(v) => ToSqlOutput::Owned(SqlValue::Real(*v)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Timestamp(t) => {
                ToSqlOutput::Owned(SqlValue::Text(t.format(LDDATE_FORMAT).to_string()))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp_format_matches_printf_layout() {
        assert_eq!(format_exp(1.5e-3, 0, 3), "1.500e-03");
        assert_eq!(format_exp(-250.0, 0, 2), "-2.50e+02");
        assert_eq!(
            format_exp(1.0, 22, 15),
            "  1.000000000000000e+00"
        );
        assert_eq!(format_exp(6.02e123, 0, 1), "6.0e+123");
        assert_eq!(format_exp(f64::NAN, 4, 2), " NaN");
    }

    #[test]
    fn fixed_format_and_exact_floats() {
        let v = Value::Float(2.5);
        assert_eq!(v.render(Format::Fixed { precision: 3 }, false), "2.500");
        assert_eq!(v.render(Format::Fixed { precision: 3 }, true), "2.5");
        assert_eq!(Value::Float(0.1).render(Format::Fixed { precision: 1 }, true), "0.1");
        assert_eq!(Value::Float(f64::NAN).render(Format::Fixed { precision: 3 }, false), "NaN");
    }

    #[test]
    fn nan_values_compare_equal() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(-f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(Value::Text("null".into()), Value::Null);
        assert_ne!(Value::Integer(1), Value::Float(1.0));
    }
}
