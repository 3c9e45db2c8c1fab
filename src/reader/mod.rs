//! Turn tokens into values
use fallible_iterator::FallibleIterator;

mod form;


use self::form::read_form;
pub use self::form::ReaderError;
use crate::lexer::tokenize;
use crate::vm::Value;

/// A cursor over the tokens of one source text
pub struct Reader {
    tokens: Vec<String>,
    position: usize,
}

impl Reader {
    pub fn new(source: &str) -> Reader {
        Reader {
            tokens: tokenize(source),
            position: 0,
        }
    }

    pub fn peek(&self) -> Option<&str> {
        self.tokens.get(self.position).map(|t| t.as_str())
    }

    pub fn next(&mut self) -> Option<&str> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token.as_str())
    }
}

/// The top-level forms of a source text, read one at a time
pub struct Forms {
    reader: Reader,
}

impl Forms {
    pub fn new(source: &str) -> Forms {
        Forms {
            reader: Reader::new(source),
        }
    }
}

impl FallibleIterator for Forms {
    type Item = Value;
    type Error = ReaderError;

    fn next(&mut self) -> Result<Option<Value>, ReaderError> {
        if self.reader.peek().is_none() {
            return Ok(None);
        }
        read_form(&mut self.reader).map(Some)
    }
}

/// Reads the first form of `source`. Empty input reads as `nil`.
pub fn read_str(source: &str) -> Result<Value, ReaderError> {
    Ok(Forms::new(source).next()?.unwrap_or(Value::Nil))
}
