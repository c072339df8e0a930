//! Line-oriented text form of a row.
//!
//! One row per line, tokens separated by a delimiter (runs of whitespace by
//! default). Text values that would not survive tokenizing are written inside
//! double quotes with backslash escapes; a bare `null` token stands for the
//! null NA of a text column.

use crate::core::error::KbError;
use crate::core::row::Row;
use crate::core::schema::{Column, ColumnKind, ColumnOrder, TableSchema};
use crate::core::value::Value;
use regex::Regex;
use std::sync::LazyLock;

/// Header names may be separated by commas and/or whitespace.
static HEADER_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,]+").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Whitespace,
    Char(char),
}

impl Delimiter {
    /// Accepts `space`, `tab`, `comma` or a single literal character. Quote,
    /// escape and comment characters are refused, as is anything that can
    /// appear inside a rendered number (`0-9`, letters, `-`, `+`, `.`).
    pub fn parse(name: &str) -> Result<Self, KbError> {
        let trimmed = name.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "space" | "whitespace" => Ok(Delimiter::Whitespace),
            "tab" => Ok(Delimiter::Char('\t')),
            "comma" => Ok(Delimiter::Char(',')),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(' '), None) => Ok(Delimiter::Whitespace),
                    (Some(c), None) if !Self::reserved(c) => Ok(Delimiter::Char(c)),
                    _ => Err(KbError::ConfigError(format!(
                        "unsupported token delimiter \"{}\"",
                        name
                    ))),
                }
            }
        }
    }

    fn reserved(c: char) -> bool {
        matches!(c, '"' | '\'' | '\\' | '#' | '-' | '+' | '.') || c.is_ascii_alphanumeric()
    }

    pub fn separator(&self) -> String {
        match self {
            Delimiter::Whitespace => " ".to_string(),
            Delimiter::Char(c) => c.to_string(),
        }
    }

    fn splits(&self, c: char) -> bool {
        match self {
            Delimiter::Whitespace => c.is_whitespace(),
            Delimiter::Char(d) => c == *d,
        }
    }

    /// Padding skipped around tokens.
    fn is_padding(&self, c: char) -> bool {
        match self {
            Delimiter::Whitespace => c.is_whitespace(),
            Delimiter::Char(d) => c.is_whitespace() && c != *d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextOptions {
    pub delimiter: Delimiter,
    /// Write floats in their shortest exact form instead of the column format.
    pub exact_floats: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub quoted: bool,
}

pub fn tokenize(line: &str, delimiter: Delimiter) -> Result<Vec<Token>, KbError> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.peek().is_some_and(|&c| delimiter.is_padding(c)) {
            chars.next();
        }
        let Some(&first) = chars.peek() else { break };

        if delimiter.splits(first) {
            // empty field
            chars.next();
            continue;
        }

        let token = match first {
            '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('n') => text.push('\n'),
                            Some('r') => text.push('\r'),
                            Some('t') => text.push('\t'),
                            Some(other) => text.push(other),
                            None => {
                                return Err(KbError::ParseError(format!(
                                    "dangling escape in: {}",
                                    line
                                )));
                            }
                        },
                        Some(c) => text.push(c),
                        None => {
                            return Err(KbError::ParseError(format!(
                                "unterminated quoted token in: {}",
                                line
                            )));
                        }
                    }
                }
                Token { text, quoted: true }
            }
            '\'' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => text.push(c),
                        None => {
                            return Err(KbError::ParseError(format!(
                                "unterminated quoted token in: {}",
                                line
                            )));
                        }
                    }
                }
                Token { text, quoted: true }
            }
            _ => {
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if delimiter.splits(c) {
                        break;
                    }
                    text.push(c);
                    chars.next();
                }
                let text = text.trim_end().to_string();
                if text == "," {
                    continue;
                }
                Token {
                    text,
                    quoted: false,
                }
            }
        };

        if token.quoted {
            while chars.peek().is_some_and(|&c| delimiter.is_padding(c)) {
                chars.next();
            }
            match chars.peek() {
                None => {}
                Some(&c) if delimiter.splits(c) || matches!(delimiter, Delimiter::Whitespace) => {}
                Some(&c) => {
                    return Err(KbError::ParseError(format!(
                        "unexpected '{}' after closing quote in: {}",
                        c, line
                    )));
                }
            }
        }
        tokens.push(token);
    }

    Ok(tokens)
}

/// Converts one token to a value for `column`.
pub fn parse_value(
    schema: &TableSchema,
    column: &Column,
    token: &str,
    quoted: bool,
) -> Result<Value, KbError> {
    let fail = |reason: String| {
        KbError::ParseError(format!(
            "error assigning \"{} = {}\" to {}: {}",
            column.name, token, schema.name, reason
        ))
    };
    match column.kind {
        ColumnKind::Integer { .. } => token
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| fail(e.to_string())),
        ColumnKind::Float { .. } => token
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| fail(e.to_string())),
        ColumnKind::Text { .. } if !quoted && token == "null" => Ok(Value::Null),
        ColumnKind::Text { .. } => Ok(Value::Text(token.to_string())),
    }
}

/// Parses one line into a row. Columns not named by `order` keep their NA.
pub fn parse_line(
    schema: &'static TableSchema,
    order: &ColumnOrder,
    line: &str,
    opts: &TextOptions,
) -> Result<Row, KbError> {
    let tokens = tokenize(line, opts.delimiter)?;
    if tokens.len() != order.len() {
        return Err(KbError::ParseError(format!(
            "error parsing line tokens for {}: expected {} tokens but found {}",
            schema.name,
            order.len(),
            tokens.len()
        )));
    }
    let mut row = Row::new(schema);
    for (&pos, token) in order.positions().iter().zip(tokens.iter()) {
        let column = &schema.columns[pos];
        let value = parse_value(schema, column, &token.text, token.quoted)?;
        row.set_at(pos, value)?;
    }
    Ok(row)
}

pub fn needs_quotes(s: &str, delimiter: Delimiter) -> bool {
    s.is_empty()
        || s == "null"
        || s == ","
        || s.starts_with('#')
        || s
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\') || delimiter.splits(c))
}

pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn render_line(row: &Row, order: &ColumnOrder, opts: &TextOptions) -> String {
    let schema = row.schema();
    order
        .positions()
        .iter()
        .map(|&pos| {
            let column = &schema.columns[pos];
            match row.value_at(pos) {
                Some(Value::Text(s)) if needs_quotes(s, opts.delimiter) => quote(s),
                Some(value) => value.render(column.format, opts.exact_floats),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(&opts.delimiter.separator())
}

pub fn header_line(schema: &TableSchema, order: &ColumnOrder, opts: &TextOptions) -> String {
    let separator = match opts.delimiter {
        Delimiter::Char(c) if c == ',' || c.is_whitespace() => c.to_string(),
        _ => " ".to_string(),
    };
    format!("#{}", order.names(schema).join(&separator))
}

/// Column names from a `#` header line, lowercased.
pub fn parse_header(line: &str) -> Vec<String> {
    let body = line.trim().trim_start_matches('#');
    HEADER_SPLIT
        .split(body.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{BOX_SMOOTH, EVENTID_VERSION, LR_TRACE_MODEL1};

    fn texts(tokens: Vec<Token>) -> Vec<String> {
        tokens.into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn tokenizer_handles_quotes_and_runs() {
        let tokens = tokenize("  1  \"two words\"\t'single q'  \"esc \\\" \\\\\" ", Delimiter::Whitespace)
            .unwrap();
        assert_eq!(
            texts(tokens),
            vec!["1", "two words", "single q", "esc \" \\"]
        );
    }

    #[test]
    fn tokenizer_with_char_delimiter_keeps_inner_spaces() {
        let tokens = tokenize("a b , c,,\"d,e\"", Delimiter::Char(',')).unwrap();
        assert_eq!(texts(tokens), vec!["a b", "c", "d,e"]);
    }

    #[test]
    fn tokenizer_rejects_unterminated_quote() {
        assert!(tokenize("1 \"open", Delimiter::Whitespace).is_err());
        assert!(tokenize("\"a\"b", Delimiter::Char(',')).is_err());
    }

    #[test]
    fn delimiter_names() {
        assert_eq!(Delimiter::parse("tab").unwrap(), Delimiter::Char('\t'));
        assert_eq!(Delimiter::parse("COMMA").unwrap(), Delimiter::Char(','));
        assert_eq!(Delimiter::parse("space").unwrap(), Delimiter::Whitespace);
        assert_eq!(Delimiter::parse("|").unwrap(), Delimiter::Char('|'));
        assert!(Delimiter::parse("ab").is_err());
        for reserved in ["-", "+", ".", "e", "E", "7", "\"", "#"] {
            assert!(Delimiter::parse(reserved).is_err(), "{reserved}");
        }
    }

    #[test]
    fn negative_sentinels_survive_a_char_delimiter() {
        let order = BOX_SMOOTH.default_order();
        let opts = TextOptions {
            delimiter: Delimiter::parse("|").unwrap(),
            ..TextOptions::default()
        };
        let mut row = Row::new(&BOX_SMOOTH);
        row.set_int("smooid", 7)
            .unwrap()
            .set_text("midtype", "mean")
            .unwrap()
            .set_float("hwide", 0.5)
            .unwrap();
        let line = render_line(&row, &order, &opts);
        assert!(line.ends_with("|-1"), "{line}");
        let back = parse_line(&BOX_SMOOTH, &order, &line, &opts).unwrap();
        assert_eq!(back.get_int("commid").unwrap(), -1);
        assert_eq!(back, row);
    }

    #[test]
    fn parse_line_fills_declared_order() {
        let order = BOX_SMOOTH.default_order();
        let row = parse_line(&BOX_SMOOTH, &order, "7 median 2.500 kbteam -1", &TextOptions::default())
            .unwrap();
        assert_eq!(row.get_int("smooid").unwrap(), 7);
        assert_eq!(row.get_text("midtype").unwrap(), Some("median"));
        assert_eq!(row.get_float("hwide").unwrap(), 2.5);
        assert_eq!(row.to_string(), "7 median 2.500 kbteam -1");
    }

    #[test]
    fn parse_line_reports_token_count_and_bad_tokens() {
        let order = BOX_SMOOTH.default_order();
        let opts = TextOptions::default();
        let err = parse_line(&BOX_SMOOTH, &order, "7 median 2.5 kbteam", &opts).unwrap_err();
        assert!(err.to_string().contains("expected 5 tokens but found 4"));

        let err = parse_line(&BOX_SMOOTH, &order, "7 median 2.5 kbteam -1 extra", &opts).unwrap_err();
        assert!(matches!(err, KbError::ParseError(_)));

        let err = parse_line(&BOX_SMOOTH, &order, "x median 2.5 kbteam -1", &opts).unwrap_err();
        assert!(err.to_string().contains("smooid = x"));

        let err = parse_line(&BOX_SMOOTH, &order, "7 toolongname 2.5 kbteam -1", &opts).unwrap_err();
        assert!(matches!(err, KbError::ValidationError(_)));
    }

    #[test]
    fn free_text_round_trips_through_quotes() {
        let mut row = Row::new(&EVENTID_VERSION);
        row.set_int("versionid", 3)
            .unwrap()
            .set_text("version_name", "v3")
            .unwrap()
            .set_text("descript", "tab\there, \"quoted\" and a \\ slash\nnext line")
            .unwrap()
            .set_text("auth", "null")
            .unwrap();
        let order = EVENTID_VERSION.default_order();
        let opts = TextOptions::default();
        let line = render_line(&row, &order, &opts);
        assert!(!line.contains('\n'));
        assert!(line.ends_with(" null"), "{line}");
        let back = parse_line(&EVENTID_VERSION, &order, &line, &opts).unwrap();
        assert_eq!(back, row);
        assert_eq!(back.get_text("auth").unwrap(), Some("null"));
        assert_eq!(back.get_text("ldauth").unwrap(), None);
    }

    #[test]
    fn exact_floats_preserve_full_precision() {
        let mut row = Row::new(&LR_TRACE_MODEL1);
        row.set_float("lon", 12.123456789012).unwrap().set_int("model", 2).unwrap();
        let order = LR_TRACE_MODEL1.default_order();
        let legacy = render_line(&row, &order, &TextOptions::default());
        assert!(legacy.starts_with("12.123457 -999.000000 2 -"), "{legacy}");

        let opts = TextOptions {
            exact_floats: true,
            ..TextOptions::default()
        };
        let exact = render_line(&row, &order, &opts);
        let back = parse_line(&LR_TRACE_MODEL1, &order, &exact, &opts).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn headers() {
        let order = BOX_SMOOTH.output_order(&["auth", "smooid"]).unwrap();
        let opts = TextOptions {
            delimiter: Delimiter::Char('\t'),
            ..TextOptions::default()
        };
        assert_eq!(header_line(&BOX_SMOOTH, &order, &opts), "#auth\tsmooid");
        let piped = TextOptions {
            delimiter: Delimiter::Char('|'),
            ..TextOptions::default()
        };
        let line = header_line(&BOX_SMOOTH, &order, &piped);
        assert_eq!(line, "#auth smooid");
        assert_eq!(parse_header(&line), vec!["auth", "smooid"]);
        assert_eq!(
            parse_header("# SMOOID, midtype  hwide,auth"),
            vec!["smooid", "midtype", "hwide", "auth"]
        );
    }
}
