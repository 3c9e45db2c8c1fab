use super::environment::Frame;
use super::keywords::*;
use super::quasiquote::quasiquote;
use super::value::{Callable, Closure};
use super::{evaluate, macro_expand, Environment, ExecutionError, GcShared, Step, Value};
use crate::helpers::ImmutableString;

type FormResult = Result<Step, ExecutionError>;

/// Runs the special form `items` starts with, or `None` if its head does not
/// name one
pub(super) fn special_form(items: &[Value], env: &GcShared<Environment>) -> Option<FormResult> {
    let name = items.first()?.symbol_name()?;

    let result = match name {
        DEF_BANG | VAR | GLOBAL_THIS => define(name, items, env),
        LET_STAR | LET | CONST => let_star(name, items, env),
        QUOTE => quote(name, items),
        QUASIQUOTE_EXPAND => quasiquote_expand(name, items),
        QUASIQUOTE => quasiquote_form(name, items, env),
        DEFMACRO_BANG => define_macro(name, items, env),
        MACROEXPAND => macroexpand(name, items, env),
        TRY_STAR | TRY => try_catch(name, items, env),
        DO => do_form(items, env),
        IF => if_form(name, items, env),
        FN_STAR | FUNCTION | ARROW => lambda(name, items, env),
        _ => return None,
    };
    Some(result)
}

fn symbol(value: &Value, form: &str) -> Result<ImmutableString, ExecutionError> {
    match *value {
        Value::Symbol(ref s) => Ok(s.clone()),
        _ => Err(ExecutionError::BadArgType(form.to_string(), "symbol")),
    }
}

fn arity(name: &str, items: &[Value], n: usize) -> Result<(), ExecutionError> {
    check!(items.len() == n, ExecutionError::BadArgc(name.to_string()));
    Ok(())
}

fn define(name: &str, items: &[Value], env: &GcShared<Environment>) -> FormResult {
    arity(name, items, 3)?;
    let target = symbol(&items[1], name)?;
    let value = evaluate(items[2].clone(), env.clone())?;
    Ok(Step::Return(env.borrow_mut().set(target, value)))
}

// Each binding is evaluated in the new frame, so later ones see earlier ones
fn let_star(name: &str, items: &[Value], env: &GcShared<Environment>) -> FormResult {
    arity(name, items, 3)?;
    let bindings = items[1]
        .items()
        .ok_or_else(|| ExecutionError::BadArgType(name.to_string(), "binding list"))?;
    check!(bindings.len() % 2 == 0, ExecutionError::BadArgc(name.to_string()));

    let frame = env.child(&[], vec![]);
    for pair in bindings.chunks(2) {
        let target = symbol(&pair[0], name)?;
        let value = evaluate(pair[1].clone(), frame.clone())?;
        frame.borrow_mut().set(target, value);
    }

    Ok(Step::Continue(items[2].clone(), frame))
}

fn quote(name: &str, items: &[Value]) -> FormResult {
    arity(name, items, 2)?;
    Ok(Step::Return(items[1].clone()))
}

fn quasiquote_expand(name: &str, items: &[Value]) -> FormResult {
    arity(name, items, 2)?;
    Ok(Step::Return(quasiquote(&items[1])))
}

fn quasiquote_form(name: &str, items: &[Value], env: &GcShared<Environment>) -> FormResult {
    arity(name, items, 2)?;
    Ok(Step::Continue(quasiquote(&items[1]), env.clone()))
}

fn define_macro(name: &str, items: &[Value], env: &GcShared<Environment>) -> FormResult {
    arity(name, items, 3)?;
    let target = symbol(&items[1], name)?;
    let function = evaluate(items[2].clone(), env.clone())?;
    let mac = function
        .to_macro()
        .ok_or_else(|| ExecutionError::BadArgType(name.to_string(), "function"))?;
    debug!("defmacro! {}", target);
    Ok(Step::Return(env.borrow_mut().set(target, mac)))
}

fn macroexpand(name: &str, items: &[Value], env: &GcShared<Environment>) -> FormResult {
    arity(name, items, 2)?;
    macro_expand(items[1].clone(), env).map(Step::Return)
}

// The catch clause is checked before the body runs
fn try_catch(name: &str, items: &[Value], env: &GcShared<Environment>) -> FormResult {
    check!(
        items.len() == 2 || items.len() == 3,
        ExecutionError::BadArgc(name.to_string())
    );

    let handler = match items.get(2) {
        Some(form) => {
            let clause = form
                .items()
                .filter(|c| form.is_list() && c.len() == 3)
                .ok_or_else(|| ExecutionError::BadArgType(name.to_string(), "catch clause"))?;
            let head = clause[0].symbol_name().unwrap_or("");
            check!(
                one_of!(head, [CATCH_STAR, CATCH]),
                ExecutionError::BadArgType(name.to_string(), "catch clause")
            );
            Some((symbol(&clause[1], name)?, clause[2].clone()))
        }
        None => None,
    };

    match evaluate(items[1].clone(), env.clone()) {
        Ok(value) => Ok(Step::Return(value)),
        Err(e) => match handler {
            None => Err(e),
            Some((binder, body)) => {
                debug!("caught: {}", e);
                let frame = env.child(&[binder], vec![e.into_error_value()]);
                Ok(Step::Continue(body, frame))
            }
        },
    }
}

fn do_form(items: &[Value], env: &GcShared<Environment>) -> FormResult {
    let (last, init) = match items[1..].split_last() {
        Some(split) => split,
        None => return Ok(Step::Return(Value::Nil)),
    };
    for item in init {
        evaluate(item.clone(), env.clone())?;
    }
    Ok(Step::Continue(last.clone(), env.clone()))
}

fn if_form(name: &str, items: &[Value], env: &GcShared<Environment>) -> FormResult {
    check!(
        items.len() == 3 || items.len() == 4,
        ExecutionError::BadArgc(name.to_string())
    );
    let condition = evaluate(items[1].clone(), env.clone())?;
    if bool::from(&condition) {
        Ok(Step::Continue(items[2].clone(), env.clone()))
    } else if let Some(otherwise) = items.get(3) {
        Ok(Step::Continue(otherwise.clone(), env.clone()))
    } else {
        Ok(Step::Return(Value::Nil))
    }
}

fn lambda(name: &str, items: &[Value], env: &GcShared<Environment>) -> FormResult {
    arity(name, items, 3)?;
    let parameters = items[1]
        .items()
        .ok_or_else(|| ExecutionError::BadArgType(name.to_string(), "parameter list"))?
        .iter()
        .map(|p| symbol(p, name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Step::Return(Value::function(Callable::Closure(Closure {
        parameters,
        body: items[2].clone(),
        environment: env.clone(),
    }))))
}
