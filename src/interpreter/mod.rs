//! Read and evaluate whole source texts
use fallible_iterator::FallibleIterator;
use std::error::Error;
use std::fmt;

use crate::printer::print_string;
use crate::reader::{Forms, ReaderError};
use crate::vm::{default_env, evaluate, Environment, ExecutionError, GcShared, Value};

#[derive(Debug, PartialEq)]
pub enum InterpreterError {
    Reader(ReaderError),
    Exec(ExecutionError),
}

impl fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            InterpreterError::Reader(ref e) => write!(f, "{}", e),
            InterpreterError::Exec(ref e) => write!(f, "{}", e),
        }
    }
}

impl Error for InterpreterError {}

impl From<ReaderError> for InterpreterError {
    fn from(e: ReaderError) -> InterpreterError {
        InterpreterError::Reader(e)
    }
}

impl From<ExecutionError> for InterpreterError {
    fn from(e: ExecutionError) -> InterpreterError {
        InterpreterError::Exec(e)
    }
}

/// Name bound to the script arguments
pub const ARGV: &str = "*ARGV*";

const PRELUDE: &str = r#"
(def! not (fn* (a) (if a false true)))

(defmacro! cond
  (fn* (& xs)
    (if (> (count xs) 0)
      (list 'if (first xs)
        (if (> (count xs) 1)
          (nth xs 1)
          (throw "odd number of forms to cond"))
        (cons 'cond (rest (rest xs)))))))

(def! load-file
  (fn* (f) (eval (read-string (str "(do " (slurp f) "\nnil)")))))
"#;

/// The native functions plus the definitions written in the language itself
pub fn init_env() -> Result<GcShared<Environment>, InterpreterError> {
    let environment = default_env();
    interpret(PRELUDE, environment.clone())?;
    environment
        .borrow_mut()
        .set(ARGV.into(), Value::list(vec![]));
    Ok(environment)
}

/// Evaluates every form of `code` in order, returning the last value
/// (`nil` when there is none)
pub fn interpret(
    code: &str,
    environment: GcShared<Environment>,
) -> Result<Value, InterpreterError> {
    let mut forms = Forms::new(code);
    let mut value = Value::Nil;

    while let Some(form) = forms.next()? {
        value = evaluate(form, environment.clone())?;
    }

    Ok(value)
}

/// Read, evaluate and print readably
pub fn rep(code: &str, environment: GcShared<Environment>) -> Result<String, InterpreterError> {
    interpret(code, environment).map(|value| print_string(&value, true))
}
