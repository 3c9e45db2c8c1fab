//! Tree-walking evaluator
use std::error::Error;
use std::fmt;

use self::gc::shared;
use crate::printer::print_string;
use crate::reader::ReaderError;

pub use self::environment::{Environment, Frame};
pub use self::gc::GcShared;
pub use self::value::{Callable, Closure, ErrorKind, Function, NativeFunction, Value};

mod environment;
mod forms;
pub mod gc;
mod keywords;
pub mod map;
mod quasiquote;
mod stdlib;
mod value;

#[cfg(test)]
mod test;

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// Wrong number of arguments to a function or special form
    BadArgc(String),
    /// Function or form name, and what it expected
    BadArgType(String, &'static str),
    UnboundVar(String),
    IndexOutOfRange(String),
    Reader(ReaderError),
    Io(String),
    /// A value raised with `throw`
    Thrown(Value),
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::ExecutionError::*;
        match *self {
            BadArgc(ref name) => write!(f, "wrong number of arguments to '{}'", name),
            BadArgType(ref name, expected) => write!(f, "'{}' expected {}", name, expected),
            UnboundVar(ref name) => write!(f, "'{}' not found", name),
            IndexOutOfRange(ref name) => write!(f, "'{}': index out of range", name),
            Reader(ref e) => write!(f, "{}", e),
            Io(ref message) => write!(f, "{}", message),
            Thrown(ref value) => write!(f, "{}", print_string(value, true)),
        }
    }
}

impl Error for ExecutionError {}

impl From<ReaderError> for ExecutionError {
    fn from(e: ReaderError) -> ExecutionError {
        ExecutionError::Reader(e)
    }
}

impl ExecutionError {
    pub fn kind(&self) -> ErrorKind {
        use self::ExecutionError::*;
        match *self {
            BadArgc(..) | BadArgType(..) => ErrorKind::TypeError,
            UnboundVar(..) => ErrorKind::ReferenceError,
            IndexOutOfRange(..) => ErrorKind::RangeError,
            Reader(..) => ErrorKind::SyntaxError,
            Io(..) => ErrorKind::Error,
            Thrown(Value::Error(ref e)) => e.kind,
            Thrown(..) => ErrorKind::Error,
        }
    }

    /// The value a `catch*` clause binds for this error
    pub fn into_error_value(self) -> Value {
        match self {
            ExecutionError::Thrown(value @ Value::Error(..)) => value,
            ExecutionError::Thrown(value) => Value::error(value, ErrorKind::Error, Value::Nil),
            other => Value::error(Value::string(&other.to_string()), other.kind(), Value::Nil),
        }
    }
}

/// Outcome of one trampoline iteration
pub(crate) enum Step {
    /// Evaluate this form in this environment next, without growing the stack
    Continue(Value, GcShared<Environment>),
    Return(Value),
}

pub fn null_env() -> GcShared<Environment> {
    shared(Environment::default())
}

/// A root frame holding every native function
pub fn default_env() -> GcShared<Environment> {
    let env = null_env();
    {
        let mut frame = env.borrow_mut();
        for &(name, fun, arity) in stdlib::STDLIB.iter() {
            frame.set(
                name.into(),
                Value::function(Callable::Native(NativeFunction { name, fun, arity })),
            );
        }
    }
    env
}

pub fn evaluate(mut ast: Value, mut env: GcShared<Environment>) -> Result<Value, ExecutionError> {
    loop {
        trace!("evaluate: {:?}", ast);

        ast = macro_expand(ast, &env)?;

        let items = match ast {
            Value::List(ref items, _) if !items.is_empty() => items.clone(),
            _ => return evaluate_ast(&ast, &env),
        };

        let step = match forms::special_form(&items, &env) {
            Some(step) => step?,
            None => apply_form(&items, &env)?,
        };

        match step {
            Step::Continue(next, next_env) => {
                ast = next;
                env = next_env;
            }
            Step::Return(value) => return Ok(value),
        }
    }
}

/// Evaluates a form that is not a call: symbols are looked up, collections
/// are rebuilt from their evaluated elements, everything else evaluates
/// to itself.
pub fn evaluate_ast(ast: &Value, env: &GcShared<Environment>) -> Result<Value, ExecutionError> {
    match *ast {
        Value::Symbol(ref name) => env.borrow().get(name),
        Value::List(ref items, _) => Ok(Value::list(evaluate_all(items, env)?)),
        Value::Vector(ref items, _) => Ok(Value::vector(evaluate_all(items, env)?)),
        Value::Map(ref m, _) => {
            let mut evaluated = map::Map::new();
            for (key, value) in m.iter() {
                evaluated.insert(key.clone(), evaluate(value.clone(), env.clone())?);
            }
            Ok(Value::map(evaluated))
        }
        _ => Ok(ast.clone()),
    }
}

fn evaluate_all(items: &[Value], env: &GcShared<Environment>) -> Result<Vec<Value>, ExecutionError> {
    items
        .iter()
        .map(|item| evaluate(item.clone(), env.clone()))
        .collect()
}

// Generic application. Closure calls continue the trampoline, so calls in
// tail position do not grow the stack.
fn apply_form(items: &[Value], env: &GcShared<Environment>) -> Result<Step, ExecutionError> {
    let mut args = evaluate_all(items, env)?;
    let head = args.remove(0);

    let function = match head {
        Value::Function(ref f, _) => f.clone(),
        other => return Ok(Step::Return(other)),
    };

    match function.callable {
        Callable::Closure(ref closure) => {
            debug!("call: {:?} with {} argument(s)", closure.parameters, args.len());
            let frame = closure.environment.child(&closure.parameters, args);
            Ok(Step::Continue(closure.body.clone(), frame))
        }
        Callable::Native(ref native) => call_native(native, args, env).map(Step::Return),
    }
}

fn call_native(
    native: &NativeFunction,
    args: Vec<Value>,
    env: &GcShared<Environment>,
) -> Result<Value, ExecutionError> {
    let (required, variadic) = native.arity;
    check!(
        args.len() == required || (variadic && args.len() > required),
        ExecutionError::BadArgc(native.name.to_string())
    );
    (native.fun)(args, env)
}

/// Calls `function` with already evaluated arguments
pub fn apply(
    function: &Value,
    args: Vec<Value>,
    env: &GcShared<Environment>,
) -> Result<Value, ExecutionError> {
    let function = match *function {
        Value::Function(ref f, _) => f,
        _ => return Err(ExecutionError::BadArgType("apply".to_string(), "function")),
    };

    match function.callable {
        Callable::Closure(ref closure) => {
            let frame = closure.environment.child(&closure.parameters, args);
            evaluate(closure.body.clone(), frame)
        }
        Callable::Native(ref native) => call_native(native, args, env),
    }
}

/// The macro `ast` invokes, if it is a call to one
pub fn is_macro_call(ast: &Value, env: &GcShared<Environment>) -> Option<Value> {
    let name = match *ast {
        Value::List(ref items, _) => items.first()?.symbol_name()?.to_string(),
        _ => return None,
    };
    let value = env.borrow().lookup(&name)?;
    if value.is_macro() {
        Some(value)
    } else {
        None
    }
}

/// Expands `ast` until its head no longer names a macro
pub fn macro_expand(mut ast: Value, env: &GcShared<Environment>) -> Result<Value, ExecutionError> {
    while let Some(mac) = is_macro_call(&ast, env) {
        let args = ast.items().map(|items| items[1..].to_vec()).unwrap_or_default();
        debug!("macro expansion of {:?}", ast);
        ast = apply(&mac, args, env)?;
    }
    Ok(ast)
}
