use gc::{Finalize, Gc, Trace};
use std::fmt::{self, Debug, Formatter};

use super::environment::Environment;
use super::gc::GcShared;
use super::map::Map;
use super::ExecutionError;
use crate::helpers::ImmutableString;
use crate::printer::print_string;

/// Optional metadata attached to collections and functions (`with-meta`)
pub type Meta = Option<Gc<Value>>;

/// Ensemble values. Code and data share this representation.
#[derive(Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    /// Every number is a double
    Number(f64),
    String(ImmutableString),
    Symbol(ImmutableString),
    /// A keyword, stored without its `:` marker
    Keyword(ImmutableString),
    List(Gc<Vec<Value>>, Meta),
    Vector(Gc<Vec<Value>>, Meta),
    /// Keys are kept in their canonical string encoding (see `map::map_key`)
    Map(Gc<Map>, Meta),
    Function(Gc<Function>, Meta),
    /// A mutable cell, changed only through `reset!` and `swap!`
    Atom(GcShared<Value>),
    Error(Gc<ErrorValue>),
}

/// The seven kinds an error value may be tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Error,
    AggregateError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    URIError,
}

const ERROR_KINDS: &[ErrorKind] = &[
    ErrorKind::Error,
    ErrorKind::AggregateError,
    ErrorKind::RangeError,
    ErrorKind::ReferenceError,
    ErrorKind::SyntaxError,
    ErrorKind::TypeError,
    ErrorKind::URIError,
];

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::AggregateError => "AggregateError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::URIError => "URIError",
        }
    }

    pub fn from_name(name: &str) -> Option<ErrorKind> {
        ERROR_KINDS.iter().cloned().find(|kind| kind.name() == name)
    }
}

#[derive(Debug, Clone)]
pub struct ErrorValue {
    pub payload: Value,
    pub kind: ErrorKind,
    pub cause: Value,
}

impl Finalize for ErrorValue {}
unsafe impl Trace for ErrorValue {
    custom_trace!(this, {
        mark(&this.payload);
        mark(&this.cause);
    });
}

/// Signature shared by every natively implemented function. The environment
/// is the one the call happened in.
pub type NatFn = fn(Vec<Value>, &GcShared<Environment>) -> Result<Value, ExecutionError>;

#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub fun: NatFn,
    /// Required argument count, and whether more are accepted
    pub arity: (usize, bool),
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "NativeFunction({}, {:?})", self.name, self.arity)
    }
}

/// A user function: formal parameters, unevaluated body and the frame it
/// was created in.
#[derive(Clone)]
pub struct Closure {
    pub parameters: Vec<ImmutableString>,
    pub body: Value,
    pub environment: GcShared<Environment>,
}

impl Debug for Closure {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Closure")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum Callable {
    Native(NativeFunction),
    Closure(Closure),
}

#[derive(Debug, Clone)]
pub struct Function {
    pub callable: Callable,
    pub is_macro: bool,
}

impl Finalize for Function {}
unsafe impl Trace for Function {
    custom_trace!(this, {
        if let Callable::Closure(ref closure) = this.callable {
            mark(&closure.body);
            mark(&closure.environment);
        }
    });
}

impl Finalize for Value {}
unsafe impl Trace for Value {
    custom_trace!(this, {
        use self::Value::*;
        match *this {
            List(ref items, ref meta) | Vector(ref items, ref meta) => {
                mark(items);
                mark(meta);
            }
            Map(ref map, ref meta) => {
                mark(map);
                mark(meta);
            }
            Function(ref function, ref meta) => {
                mark(function);
                mark(meta);
            }
            Atom(ref cell) => mark(cell),
            Error(ref error) => mark(error),
            Nil | Boolean(_) | Number(_) | String(_) | Symbol(_) | Keyword(_) => {}
        }
    });
}

// Structural equality for lists, vectors and maps; everything else compares
// within its own variant. Lists and vectors never equal each other.
impl PartialEq<Value> for Value {
    fn eq(&self, other: &Value) -> bool {
        use self::Value::*;

        match (self, other) {
            (&Nil, &Nil) => true,
            (&Boolean(x), &Boolean(y)) => x == y,
            (&Number(n), &Number(m)) => n == m,
            (&String(ref x), &String(ref y))
            | (&Symbol(ref x), &Symbol(ref y))
            | (&Keyword(ref x), &Keyword(ref y)) => x == y,
            (&List(ref xs, _), &List(ref ys, _)) | (&Vector(ref xs, _), &Vector(ref ys, _)) => {
                xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(x, y)| x == y)
            }
            (&Map(ref m, _), &Map(ref n, _)) => **m == **n,
            (&Function(ref f, _), &Function(ref g, _)) => Gc::ptr_eq(f, g),
            (&Atom(ref a), &Atom(ref b)) => Gc::ptr_eq(a, b),
            (&Error(ref e), &Error(ref f)) => e.kind == f.kind && e.payload == f.payload,
            _ => false,
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&print_string(self, true))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&print_string(self, false))
    }
}

// Truthiness: only `false` and `nil` are falsy, 0 is truthy
impl<'a> From<&'a Value> for bool {
    fn from(v: &Value) -> bool {
        !matches!(*v, Value::Boolean(false) | Value::Nil)
    }
}

macro_rules! simple_type {
    ($name:ident, $var:pat) => (
        pub fn $name(&self) -> bool {
            match *self {
                $var => true,
                _ => false
            }
        }
    );
    ($name:ident, $var:pat, $var2:pat) => (
        pub fn $name(&self) -> bool {
            match *self {
                $var | $var2 => true,
                _ => false
            }
        }
    )
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Gc::new(items), None)
    }

    pub fn vector(items: Vec<Value>) -> Value {
        Value::Vector(Gc::new(items), None)
    }

    pub fn map(map: Map) -> Value {
        Value::Map(Gc::new(map), None)
    }

    pub fn string(s: &str) -> Value {
        Value::String(s.into())
    }

    pub fn symbol(s: &str) -> Value {
        Value::Symbol(s.into())
    }

    /// Builds a keyword, dropping one leading or one trailing `:` marker
    pub fn keyword(s: &str) -> Value {
        let bare = s
            .strip_prefix(':')
            .or_else(|| s.strip_suffix(':'))
            .unwrap_or(s);
        Value::Keyword(bare.into())
    }

    pub fn error(payload: Value, kind: ErrorKind, cause: Value) -> Value {
        Value::Error(Gc::new(ErrorValue {
            payload,
            kind,
            cause,
        }))
    }

    pub fn function(callable: Callable) -> Value {
        Value::Function(
            Gc::new(Function {
                callable,
                is_macro: false,
            }),
            None,
        )
    }

    simple_type!(is_nil, Value::Nil);
    simple_type!(is_symbol, Value::Symbol(..));
    simple_type!(is_keyword, Value::Keyword(..));
    simple_type!(is_string, Value::String(..));
    simple_type!(is_number, Value::Number(..));
    simple_type!(is_list, Value::List(..));
    simple_type!(is_vector, Value::Vector(..));
    simple_type!(is_map, Value::Map(..));
    simple_type!(is_atom, Value::Atom(..));
    simple_type!(is_error, Value::Error(..));
    simple_type!(is_function, Value::Function(..));
    simple_type!(is_sequential, Value::List(..), Value::Vector(..));

    /// The elements of a list or a vector
    pub fn items(&self) -> Option<&[Value]> {
        match *self {
            Value::List(ref items, _) | Value::Vector(ref items, _) => Some(&items[..]),
            _ => None,
        }
    }

    /// `Some(name)` if this is the symbol `name`
    pub fn symbol_name(&self) -> Option<&str> {
        match *self {
            Value::Symbol(ref s) => Some(s),
            _ => None,
        }
    }

    /// True for a non-empty list whose head is the symbol `name`
    pub fn starts_with_symbol(&self, name: &str) -> bool {
        match *self {
            Value::List(ref items, _) => items.first().and_then(Value::symbol_name) == Some(name),
            _ => false,
        }
    }

    pub fn is_macro(&self) -> bool {
        match *self {
            Value::Function(ref f, _) => f.is_macro,
            _ => false,
        }
    }

    pub fn meta(&self) -> Option<Value> {
        match *self {
            Value::List(_, ref meta)
            | Value::Vector(_, ref meta)
            | Value::Map(_, ref meta)
            | Value::Function(_, ref meta) => {
                Some(meta.as_ref().map(|m| (**m).clone()).unwrap_or(Value::Nil))
            }
            _ => None,
        }
    }

    /// A copy of this value carrying `meta`, for the variants that take metadata
    pub fn with_meta(&self, meta: Value) -> Option<Value> {
        let meta = Some(Gc::new(meta));
        match *self {
            Value::List(ref items, _) => Some(Value::List(items.clone(), meta)),
            Value::Vector(ref items, _) => Some(Value::Vector(items.clone(), meta)),
            Value::Map(ref map, _) => Some(Value::Map(map.clone(), meta)),
            Value::Function(ref f, _) => Some(Value::Function(f.clone(), meta)),
            _ => None,
        }
    }

    /// Fresh copy of a function value flagged as a macro. Closure data is
    /// shared with the original; the original stays a plain function.
    pub fn to_macro(&self) -> Option<Value> {
        match *self {
            Value::Function(ref f, ref meta) => {
                let mut copy = (**f).clone();
                copy.is_macro = true;
                Some(Value::Function(Gc::new(copy), meta.clone()))
            }
            _ => None,
        }
    }
}
