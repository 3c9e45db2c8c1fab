use regex::Regex;
use std::error::Error;
use std::fmt;
use std::sync::LazyLock;

use super::Reader;
use crate::vm::map::{map_key, Map};
use crate::vm::Value;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("number pattern is valid"));
static STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(?:\\.|[^\\"])*"$"#).expect("string pattern is valid"));

const KEYWORD_MARKER: char = ':';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    UnexpectedEOF,
    /// A closer with no matching opener, or the wrong closer
    UnexpectedToken(String),
    UnterminatedString,
    OddMapEntries,
    InvalidMapKey(String),
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ReaderError::UnexpectedEOF => write!(f, "unexpected EOF"),
            ReaderError::UnexpectedToken(ref t) => write!(f, "unexpected '{}'", t),
            ReaderError::UnterminatedString => write!(f, "expected '\"', got EOF"),
            ReaderError::OddMapEntries => write!(f, "odd number of map entries"),
            ReaderError::InvalidMapKey(ref k) => write!(f, "invalid map key {}", k),
        }
    }
}

impl Error for ReaderError {}

pub fn read_form(reader: &mut Reader) -> Result<Value, ReaderError> {
    let token = reader.next().ok_or(ReaderError::UnexpectedEOF)?.to_string();

    let wrap = |name: &str, reader: &mut Reader| -> Result<Value, ReaderError> {
        let form = read_form(reader)?;
        Ok(Value::list(vec![Value::symbol(name), form]))
    };

    match token.as_str() {
        "'" => wrap("quote", reader),
        "`" => wrap("quasiquote", reader),
        "~" => wrap("unquote", reader),
        "~@" => wrap("splice-unquote", reader),
        "@" => wrap("deref", reader),
        "^" => {
            let meta = read_form(reader)?;
            let target = read_form(reader)?;
            Ok(Value::list(vec![Value::symbol("with-meta"), target, meta]))
        }
        "(" => Ok(Value::list(read_sequence(reader, ")")?)),
        "[" => Ok(Value::vector(read_sequence(reader, "]")?)),
        "{" => read_map(reader),
        ")" | "]" | "}" => Err(ReaderError::UnexpectedToken(token)),
        _ => read_atom(&token),
    }
}

// Assumes the opener has been consumed
fn read_sequence(reader: &mut Reader, closer: &str) -> Result<Vec<Value>, ReaderError> {
    let mut items = vec![];
    loop {
        match reader.peek().map(|t| t == closer) {
            None => return Err(ReaderError::UnexpectedEOF),
            Some(true) => {
                reader.next();
                return Ok(items);
            }
            Some(false) => items.push(read_form(reader)?),
        }
    }
}

fn read_map(reader: &mut Reader) -> Result<Value, ReaderError> {
    let items = read_sequence(reader, "}")?;
    if items.len() % 2 != 0 {
        return Err(ReaderError::OddMapEntries);
    }

    let mut map = Map::new();
    for pair in items.chunks(2) {
        let key = map_key(&pair[0], "reader")
            .map_err(|_| ReaderError::InvalidMapKey(format!("{:?}", pair[0])))?;
        map.insert(key, pair[1].clone());
    }
    Ok(Value::map(map))
}

fn read_atom(token: &str) -> Result<Value, ReaderError> {
    match token {
        "nil" => return Ok(Value::Nil),
        "true" => return Ok(Value::Boolean(true)),
        "false" => return Ok(Value::Boolean(false)),
        _ => {}
    }

    if NUMBER.is_match(token) {
        // The pattern only admits valid float syntax
        return token
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| ReaderError::UnexpectedToken(token.to_string()));
    }

    if token.starts_with('"') {
        if !STRING.is_match(token) {
            return Err(ReaderError::UnterminatedString);
        }
        return Ok(Value::String(unescape(&token[1..token.len() - 1]).into()));
    }

    if token.len() > 1 && (token.starts_with(KEYWORD_MARKER) || token.ends_with(KEYWORD_MARKER)) {
        return Ok(Value::keyword(token));
    }

    Ok(Value::symbol(token))
}

/// `\n` becomes a newline, any other escaped character stands for itself
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
