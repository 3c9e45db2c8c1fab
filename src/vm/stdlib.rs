use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

use super::environment::Frame;
use super::map::{map_key, Map};
use super::value::{ErrorKind, NatFn};
use super::{apply, evaluate, Environment, ExecutionError, GcShared, Value};
use crate::printer::print_string;
use crate::reader::read_str;

type NativeResult = Result<Value, ExecutionError>;

/// Name, implementation and arity (required arguments, variadic) of every
/// native function
pub static STDLIB: &[(&str, NatFn, (usize, bool))] = &[
    ("nil?", is_nil, (1, false)),
    ("true?", is_true, (1, false)),
    ("false?", is_false, (1, false)),
    ("string?", is_string, (1, false)),
    ("symbol?", is_symbol, (1, false)),
    ("keyword?", is_keyword, (1, false)),
    ("number?", is_number, (1, false)),
    ("fn?", is_fn, (1, false)),
    ("macro?", is_macro, (1, false)),
    ("list?", is_list, (1, false)),
    ("vector?", is_vector, (1, false)),
    ("map?", is_map, (1, false)),
    ("sequential?", is_sequential, (1, false)),
    ("atom?", is_atom, (1, false)),
    ("error?", is_error, (1, false)),
    ("empty?", is_empty, (1, false)),
    ("=", equal, (2, false)),
    ("<", less, (2, false)),
    ("<=", less_equal, (2, false)),
    (">", greater, (2, false)),
    (">=", greater_equal, (2, false)),
    ("+", add, (2, false)),
    ("-", sub, (2, false)),
    ("*", mul, (2, false)),
    ("/", div, (2, false)),
    ("time-ms", time_ms, (0, false)),
    ("symbol", symbol, (1, false)),
    ("keyword", keyword, (1, false)),
    ("list", list, (0, true)),
    ("vector", vector, (0, true)),
    ("hash-map", hash_map, (0, true)),
    ("dict", hash_map, (0, true)),
    ("atom", atom, (1, false)),
    ("error", error, (1, true)),
    ("error-kind", error_kind, (1, false)),
    ("error-cause", error_cause, (1, false)),
    ("pr-str", pr_str, (0, true)),
    ("str", str, (0, true)),
    ("prn", prn, (0, true)),
    ("println", println, (0, true)),
    ("console.log", println, (0, true)),
    ("join", join, (1, true)),
    ("trim", trim, (1, false)),
    ("read-string", read_string, (1, false)),
    ("readline", readline, (1, false)),
    ("slurp", slurp, (1, false)),
    ("read-file", slurp, (1, false)),
    ("spit", spit, (2, false)),
    ("write-file", spit, (2, false)),
    ("cons", cons, (2, false)),
    ("concat", concat, (0, true)),
    ("vec", vec, (1, false)),
    ("nth", nth, (2, false)),
    ("first", first, (1, false)),
    ("rest", rest, (1, false)),
    ("last", last, (1, false)),
    ("count", count, (1, false)),
    ("conj", conj, (1, true)),
    ("seq", seq, (1, false)),
    ("assoc", assoc, (1, true)),
    ("dissoc", dissoc, (1, true)),
    ("get", get, (2, false)),
    ("contains?", contains, (2, false)),
    ("keys", keys, (1, false)),
    ("vals", vals, (1, false)),
    ("apply", apply_fn, (1, true)),
    ("map", map, (2, false)),
    ("swap!", swap, (2, true)),
    ("reset!", reset, (2, false)),
    ("deref", deref, (1, false)),
    ("meta", meta, (1, false)),
    ("with-meta", with_meta, (2, false)),
    ("throw", throw, (1, false)),
    ("eval", eval, (1, false)),
];

//
// Predicates
//
macro_rules! predicate {
    ($fun:ident, $test:expr) => (
        fn $fun(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
            let test: fn(&Value) -> bool = $test;
            Ok(Value::Boolean(test(&args[0])))
        }
    )
}

predicate!(is_nil, Value::is_nil);
predicate!(is_true, |v| *v == Value::Boolean(true));
predicate!(is_false, |v| *v == Value::Boolean(false));
predicate!(is_string, Value::is_string);
predicate!(is_symbol, Value::is_symbol);
predicate!(is_keyword, Value::is_keyword);
predicate!(is_number, Value::is_number);
predicate!(is_fn, |v| v.is_function() && !v.is_macro());
predicate!(is_macro, Value::is_macro);
predicate!(is_list, Value::is_list);
predicate!(is_vector, Value::is_vector);
predicate!(is_map, Value::is_map);
predicate!(is_sequential, Value::is_sequential);
predicate!(is_atom, Value::is_atom);
predicate!(is_error, Value::is_error);

fn is_empty(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let empty = match args[0] {
        Value::Nil => true,
        Value::List(ref items, _) | Value::Vector(ref items, _) => items.is_empty(),
        Value::Map(ref m, _) => m.is_empty(),
        Value::String(ref s) => s.is_empty(),
        _ => return Err(ExecutionError::BadArgType("empty?".to_string(), "collection")),
    };
    Ok(Value::Boolean(empty))
}

//
// Numbers and comparison
//
fn numbers(args: &[Value], name: &str) -> Result<(f64, f64), ExecutionError> {
    let a = expect_variant!(args[0], Value::Number(n) => n, name, "number");
    let b = expect_variant!(args[1], Value::Number(n) => n, name, "number");
    Ok((a, b))
}

macro_rules! arithmetic {
    ($fun:ident, $name:expr, $op:tt) => (
        fn $fun(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
            let (a, b) = numbers(&args, $name)?;
            Ok(Value::Number(a $op b))
        }
    )
}

macro_rules! comparison {
    ($fun:ident, $name:expr, $op:tt) => (
        fn $fun(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
            let (a, b) = numbers(&args, $name)?;
            Ok(Value::Boolean(a $op b))
        }
    )
}

arithmetic!(add, "+", +);
arithmetic!(sub, "-", -);
arithmetic!(mul, "*", *);
arithmetic!(div, "/", /);
comparison!(less, "<", <);
comparison!(less_equal, "<=", <=);
comparison!(greater, ">", >);
comparison!(greater_equal, ">=", >=);

fn equal(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    Ok(Value::Boolean(args[0] == args[1]))
}

fn time_ms(_: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ExecutionError::Io(e.to_string()))?;
    Ok(Value::Number(elapsed.as_millis() as f64))
}

//
// Constructors
//
fn symbol(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let name = expect_variant!(args[0], Value::String(ref s) => s.clone(), "symbol", "string");
    Ok(Value::Symbol(name))
}

fn keyword(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    match args[0] {
        Value::Keyword(..) => Ok(args[0].clone()),
        Value::String(ref s) => Ok(Value::keyword(s)),
        _ => Err(ExecutionError::BadArgType("keyword".to_string(), "string")),
    }
}

fn list(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    Ok(Value::list(args))
}

fn vector(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    Ok(Value::vector(args))
}

fn hash_map(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    Ok(Value::map(Map::from_pairs(&args, "hash-map")?))
}

fn atom(mut args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    Ok(Value::Atom(super::gc::shared(args.remove(0))))
}

// (error payload [kind [cause]])
fn error(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    check!(args.len() <= 3, ExecutionError::BadArgc("error".to_string()));
    let kind = match args.get(1) {
        None | Some(&Value::Nil) => ErrorKind::Error,
        Some(&Value::String(ref name)) => ErrorKind::from_name(name)
            .ok_or_else(|| ExecutionError::BadArgType("error".to_string(), "error kind"))?,
        Some(_) => return Err(ExecutionError::BadArgType("error".to_string(), "error kind")),
    };
    let cause = args.get(2).cloned().unwrap_or(Value::Nil);
    Ok(Value::error(args[0].clone(), kind, cause))
}

fn error_kind(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let kind = expect_variant!(args[0], Value::Error(ref e) => e.kind, "error-kind", "error");
    Ok(Value::string(kind.name()))
}

fn error_cause(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let cause = expect_variant!(args[0], Value::Error(ref e) => e.cause.clone(), "error-cause", "error");
    Ok(cause)
}

//
// Printing
//
fn print_all(args: &[Value], readably: bool, separator: &str) -> String {
    args.iter()
        .map(|v| print_string(v, readably))
        .collect::<Vec<_>>()
        .join(separator)
}

fn pr_str(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    Ok(Value::string(&print_all(&args, true, " ")))
}

fn str(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    Ok(Value::string(&print_all(&args, false, "")))
}

fn prn(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    println!("{}", print_all(&args, true, " "));
    Ok(Value::Nil)
}

fn println(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    println!("{}", print_all(&args, false, " "));
    Ok(Value::Nil)
}

// (join seq [delimiter])
fn join(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    check!(args.len() <= 2, ExecutionError::BadArgc("join".to_string()));
    let items = args[0]
        .items()
        .ok_or_else(|| ExecutionError::BadArgType("join".to_string(), "list or vector"))?;
    let delimiter = match args.get(1) {
        None => " ".into(),
        Some(&Value::String(ref s)) => s.clone(),
        Some(_) => return Err(ExecutionError::BadArgType("join".to_string(), "string")),
    };
    Ok(Value::string(&print_all(items, false, &delimiter)))
}

fn trim(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let s = expect_variant!(args[0], Value::String(ref s) => s.clone(), "trim", "string");
    Ok(Value::string(s.trim()))
}

//
// Reading and files
//
fn read_string(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let source = expect_variant!(args[0], Value::String(ref s) => s.clone(), "read-string", "string");
    Ok(read_str(&source)?)
}

fn readline(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let prompt = expect_variant!(args[0], Value::String(ref s) => s.clone(), "readline", "string");
    let mut editor = DefaultEditor::new().map_err(|e| ExecutionError::Io(e.to_string()))?;
    match editor.readline(&prompt) {
        Ok(line) => Ok(Value::string(&line)),
        Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(Value::Nil),
        Err(e) => Err(ExecutionError::Io(e.to_string())),
    }
}

fn slurp(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let path = expect_variant!(args[0], Value::String(ref s) => s.clone(), "slurp", "string");
    info!("reading {}", path);
    fs::read_to_string(&*path)
        .map(|content| Value::string(&content))
        .map_err(|e| ExecutionError::Io(format!("{}: {}", path, e)))
}

fn spit(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let path = expect_variant!(args[0], Value::String(ref s) => s.clone(), "spit", "string");
    let content = expect_variant!(args[1], Value::String(ref s) => s.clone(), "spit", "string");
    fs::write(&*path, content.as_bytes()).map_err(|e| ExecutionError::Io(format!("{}: {}", path, e)))?;
    Ok(Value::Nil)
}

//
// Sequences
//
fn sequence<'a>(value: &'a Value, name: &str) -> Result<&'a [Value], ExecutionError> {
    value
        .items()
        .ok_or_else(|| ExecutionError::BadArgType(name.to_string(), "list or vector"))
}

fn cons(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let mut items = vec![args[0].clone()];
    items.extend_from_slice(sequence(&args[1], "cons")?);
    Ok(Value::list(items))
}

fn concat(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let mut items = vec![];
    for arg in args.iter() {
        items.extend_from_slice(sequence(arg, "concat")?);
    }
    Ok(Value::list(items))
}

fn vec(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    match args[0] {
        Value::List(ref items, _) => Ok(Value::Vector(items.clone(), None)),
        ref other => Ok(other.clone()),
    }
}

fn nth(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let items = sequence(&args[0], "nth")?;
    let index = expect_variant!(args[1], Value::Number(n) => n, "nth", "number");
    check!(
        index >= 0.0 && index.fract() == 0.0 && (index as usize) < items.len(),
        ExecutionError::IndexOutOfRange("nth".to_string())
    );
    Ok(items[index as usize].clone())
}

fn first(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    Ok(args[0]
        .items()
        .and_then(|items| items.first())
        .cloned()
        .unwrap_or(Value::Nil))
}

fn rest(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let tail = match args[0].items() {
        Some(items) if !items.is_empty() => items[1..].to_vec(),
        _ => vec![],
    };
    Ok(Value::list(tail))
}

fn last(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    Ok(args[0]
        .items()
        .and_then(|items| items.last())
        .cloned()
        .unwrap_or(Value::Nil))
}

fn count(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let n = match args[0] {
        Value::Nil => 0,
        Value::List(ref items, _) | Value::Vector(ref items, _) => items.len(),
        Value::Map(ref m, _) => m.len(),
        Value::String(ref s) => s.chars().count(),
        _ => return Err(ExecutionError::BadArgType("count".to_string(), "collection")),
    };
    Ok(Value::Number(n as f64))
}

// Lists grow at the front, vectors at the back
fn conj(mut args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let extra = args.split_off(1);
    match args[0] {
        Value::List(ref items, _) => {
            let mut result: Vec<Value> = extra.into_iter().rev().collect();
            result.extend_from_slice(items);
            Ok(Value::list(result))
        }
        Value::Vector(ref items, _) => {
            let mut result = items.to_vec();
            result.extend(extra);
            Ok(Value::vector(result))
        }
        _ => Err(ExecutionError::BadArgType("conj".to_string(), "list or vector")),
    }
}

fn seq(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let items = match args[0] {
        Value::Nil => vec![],
        Value::List(ref items, _) | Value::Vector(ref items, _) => items.to_vec(),
        Value::String(ref s) => s
            .chars()
            .map(|c| Value::string(&c.to_string()))
            .collect(),
        _ => return Err(ExecutionError::BadArgType("seq".to_string(), "sequence")),
    };
    if items.is_empty() {
        Ok(Value::Nil)
    } else {
        Ok(Value::list(items))
    }
}

//
// Maps
//
fn map_arg<'a>(value: &'a Value, name: &str) -> Result<&'a Map, ExecutionError> {
    match *value {
        Value::Map(ref m, _) => Ok(m),
        _ => Err(ExecutionError::BadArgType(name.to_string(), "map")),
    }
}

fn assoc(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let mut result = map_arg(&args[0], "assoc")?.clone();
    for (key, value) in Map::from_pairs(&args[1..], "assoc")?.iter() {
        result.insert(key.clone(), value.clone());
    }
    Ok(Value::map(result))
}

fn dissoc(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let mut result = map_arg(&args[0], "dissoc")?.clone();
    for key in args[1..].iter() {
        result.remove(&map_key(key, "dissoc")?);
    }
    Ok(Value::map(result))
}

fn get(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let m = match args[0] {
        Value::Map(ref m, _) => m,
        _ => return Ok(Value::Nil),
    };
    Ok(m.get(&map_key(&args[1], "get")?).cloned().unwrap_or(Value::Nil))
}

fn contains(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let m = map_arg(&args[0], "contains?")?;
    Ok(Value::Boolean(m.contains(&map_key(&args[1], "contains?")?)))
}

fn keys(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    Ok(Value::list(map_arg(&args[0], "keys")?.keys()))
}

fn vals(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    Ok(Value::list(map_arg(&args[0], "vals")?.values()))
}

//
// Functions and atoms
//

// (apply f a b [c d]) calls (f a b c d)
fn apply_fn(mut args: Vec<Value>, env: &GcShared<Environment>) -> NativeResult {
    let function = args.remove(0);
    if let Some(last) = args.pop() {
        let spread = sequence(&last, "apply")?.to_vec();
        args.extend(spread);
    }
    apply(&function, args, env)
}

fn map(args: Vec<Value>, env: &GcShared<Environment>) -> NativeResult {
    let results = sequence(&args[1], "map")?
        .iter()
        .map(|item| apply(&args[0], vec![item.clone()], env))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::list(results))
}

fn swap(mut args: Vec<Value>, env: &GcShared<Environment>) -> NativeResult {
    let extra = args.split_off(2);
    let cell = expect_variant!(args[0], Value::Atom(ref cell) => cell.clone(), "swap!", "atom");
    let current = cell.borrow().clone();

    let mut call_args = vec![current];
    call_args.extend(extra);
    let value = apply(&args[1], call_args, env)?;

    *cell.borrow_mut() = value.clone();
    Ok(value)
}

fn reset(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let cell = expect_variant!(args[0], Value::Atom(ref cell) => cell.clone(), "reset!", "atom");
    *cell.borrow_mut() = args[1].clone();
    Ok(args[1].clone())
}

fn deref(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let cell = expect_variant!(args[0], Value::Atom(ref cell) => cell.clone(), "deref", "atom");
    let value = cell.borrow().clone();
    Ok(value)
}

//
// Metadata
//
fn meta(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    args[0]
        .meta()
        .ok_or_else(|| ExecutionError::BadArgType("meta".to_string(), "collection or function"))
}

fn with_meta(args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    args[0]
        .with_meta(args[1].clone())
        .ok_or_else(|| ExecutionError::BadArgType("with-meta".to_string(), "collection or function"))
}

//
// Control
//
fn throw(mut args: Vec<Value>, _: &GcShared<Environment>) -> NativeResult {
    let value = args.remove(0);
    if value.is_error() {
        return Err(ExecutionError::Thrown(value));
    }
    Err(ExecutionError::Thrown(Value::error(value, ErrorKind::Error, Value::Nil)))
}

// Always evaluates in the outermost frame
fn eval(mut args: Vec<Value>, env: &GcShared<Environment>) -> NativeResult {
    evaluate(args.remove(0), env.root())
}
