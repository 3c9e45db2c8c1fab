use fallible_iterator::FallibleIterator;
use ::gc::Gc;

use super::ExecutionError::*;
use super::*;
use crate::reader::{read_str, Forms};

// Evaluates every form against a fresh root frame holding only natives
fn run(code: &str) -> Result<Value, ExecutionError> {
    let env = default_env();
    let mut forms = Forms::new(code);
    let mut value = Value::Nil;
    while let Some(form) = forms.next()? {
        value = evaluate(form, env.clone())?;
    }
    Ok(value)
}

fn value(source: &str) -> Value {
    read_str(source).unwrap()
}

fn num(n: f64) -> Value {
    Value::Number(n)
}

#[test]
fn self_evaluating() {
    assert_eq!(run("1"), Ok(num(1.0)));
    assert_eq!(run("\"s\""), Ok(Value::string("s")));
    assert_eq!(run(":k"), Ok(Value::keyword("k")));
    assert_eq!(run("nil"), Ok(Value::Nil));
    assert_eq!(run("()"), Ok(value("()")));
}

#[test]
fn collections_evaluate_their_elements() {
    assert_eq!(run("[1 (+ 1 1)]"), Ok(value("[1 2]")));
    assert_eq!(run("{:a (+ 1 1)}"), Ok(value("{:a 2}")));
}

#[test]
fn unbound_symbol() {
    assert_eq!(run("nope"), Err(UnboundVar("nope".to_string())));
    assert_eq!(
        run("nope").unwrap_err().to_string(),
        "'nope' not found"
    );
}

#[test]
fn definitions() {
    assert_eq!(run("(def! x 3) x"), Ok(num(3.0)));
    assert_eq!(run("(var x 3) (globalThis y (+ x 1)) y"), Ok(num(4.0)));
    assert_eq!(run("(def! x)"), Err(BadArgc("def!".to_string())));
    assert_eq!(run("(def! 1 2)"), Err(BadArgType("def!".to_string(), "symbol")));
}

#[test]
fn let_bindings() {
    assert_eq!(run("(let* (a 1 b (+ a 1)) b)"), Ok(num(2.0)));
    assert_eq!(run("(let [a 1] a)"), Ok(num(1.0)));
    assert_eq!(run("(let* (x 2) (let* (x 3) x))"), Ok(num(3.0)));
    assert_eq!(run("(def! x 1) (const (x 2) x) x"), Ok(num(1.0)));
    assert_eq!(run("(let* (a) a)"), Err(BadArgc("let*".to_string())));
}

#[test]
fn conditionals() {
    assert_eq!(run("(if true 1 2)"), Ok(num(1.0)));
    assert_eq!(run("(if nil 1 2)"), Ok(num(2.0)));
    assert_eq!(run("(if false 1)"), Ok(Value::Nil));
    assert_eq!(run("(if 0 1 2)"), Ok(num(1.0)));
    assert_eq!(run("(if \"\" 1 2)"), Ok(num(1.0)));
    assert_eq!(run("(if)"), Err(BadArgc("if".to_string())));
}

#[test]
fn sequencing() {
    assert_eq!(run("(do (def! a 1) (def! a (+ a 1)) a)"), Ok(num(2.0)));
    assert_eq!(run("(do 5)"), Ok(num(5.0)));
    assert_eq!(run("(do)"), Ok(Value::Nil));
}

#[test]
fn closures() {
    assert_eq!(run("((fn* (a b) (+ a b)) 1 2)"), Ok(num(3.0)));
    assert_eq!(run("((=> [a] a) 7)"), Ok(num(7.0)));
    assert_eq!(
        run("(def! adder (function (n) (fn* (x) (+ x n)))) ((adder 2) 3)"),
        Ok(num(5.0))
    );
    assert_eq!(run("((fn* (& xs) xs) 1 2)"), Ok(value("(1 2)")));
    assert_eq!(run("((fn* (a & xs) xs) 1)"), Ok(value("()")));
    assert_eq!(run("((fn* (a b & more) more) 1)"), Ok(value("()")));
    assert_eq!(run("((fn* (a b & more) b) 1)"), Err(UnboundVar("b".to_string())));
    assert_eq!(
        run("(fn* (1) 1)"),
        Err(BadArgType("fn*".to_string(), "symbol"))
    );
}

#[test]
fn closure_arity_is_not_checked() {
    assert_eq!(run("((fn* (a b) a) 1)"), Ok(num(1.0)));
    assert_eq!(run("((fn* (a b) b) 1)"), Err(UnboundVar("b".to_string())));
    assert_eq!(run("((fn* (a) a) 1 2 3)"), Ok(num(1.0)));
}

#[test]
fn non_callable_head_is_returned() {
    assert_eq!(run("(1 2 3)"), Ok(num(1.0)));
    assert_eq!(run("(\"s\")"), Ok(Value::string("s")));
}

#[test]
fn recursion_in_tail_position() {
    let code = "
        (def! sum (fn* (n acc) (if (= n 0) acc (sum (- n 1) (+ n acc)))))
        (sum 10000 0)";
    assert_eq!(run(code), Ok(num(50005000.0)));

    let code = "
        (def! count-down (fn* (n) (do (if (= n 0) :done (count-down (- n 1))))))
        (count-down 20000)";
    assert_eq!(run(code), Ok(Value::keyword("done")));
}

#[test]
fn quoting() {
    assert_eq!(run("(quote (a b))"), Ok(value("(a b)")));
    assert_eq!(run("'a"), Ok(Value::symbol("a")));
    assert_eq!(run("(def! a 8) `[1 ~a 3]"), Ok(value("[1 8 3]")));
    assert_eq!(run("`a"), Ok(Value::symbol("a")));
    assert_eq!(run("`(1 ~(+ 1 1) 3)"), Ok(value("(1 2 3)")));
    assert_eq!(run("(def! xs '(2 3)) `(1 ~@xs 4)"), Ok(value("(1 2 3 4)")));
    assert_eq!(
        run("(quasiquoteexpand (a ~b))"),
        Ok(value("(cons (quote a) (cons b ()))"))
    );
}

#[test]
fn macros() {
    let code = "
        (defmacro! unless (fn* (pred a b) `(if ~pred ~b ~a)))
        (unless false 7 8)";
    assert_eq!(run(code), Ok(num(7.0)));

    let code = "
        (defmacro! unless (fn* (pred a b) `(if ~pred ~b ~a)))
        (macroexpand (unless x 7 8))";
    assert_eq!(run(code), Ok(value("(if x 8 7)")));

    assert_eq!(run("(macroexpand (+ 1 2))"), Ok(value("(+ 1 2)")));
}

#[test]
fn defmacro_leaves_the_function_alone() {
    let code = "
        (def! f (fn* () 1))
        (defmacro! m f)
        (list (macro? f) (macro? m))";
    assert_eq!(run(code), Ok(value("(false true)")));
}

#[test]
fn macro_expansion_is_idempotent() {
    let code = "
        (defmacro! twice (fn* (x) `(do ~x ~x)))
        (defmacro! twice-again (fn* (x) `(twice ~x)))
        (def! once (macroexpand (twice-again 1)))
        (list once (= once (eval (list 'macroexpand once))))";
    assert_eq!(run(code), Ok(value("((do 1 1) true)")));
}

#[test]
fn try_catch() {
    assert_eq!(
        run("(try* (throw \"boom\") (catch* e (str \"caught: \" e)))"),
        Ok(Value::string("caught: boom"))
    );
    assert_eq!(run("(try* 1 (catch* e 2))"), Ok(num(1.0)));
    assert_eq!(
        run("(try (nope) (catch e (error-kind e)))"),
        Ok(Value::string("ReferenceError"))
    );
    assert_eq!(
        run("(try* (nth [] 1) (catch* e (error-kind e)))"),
        Ok(Value::string("RangeError"))
    );
    assert_eq!(
        run("(try* (cons 1) (catch* e (error-kind e)))"),
        Ok(Value::string("TypeError"))
    );
    assert_eq!(
        run("(try* (read-string \"(\") (catch* e (error-kind e)))"),
        Ok(Value::string("SyntaxError"))
    );
    assert_eq!(
        run("(try* (throw (error 1 \"URIError\")) (catch* e (list (error-kind e) e)))"),
        Ok(Value::list(vec![Value::string("URIError"), run("(error 1 \"URIError\")").unwrap()]))
    );
}

#[test]
fn uncaught_throw() {
    assert_eq!(
        run("(try* (throw 1))"),
        Err(Thrown(Value::error(num(1.0), ErrorKind::Error, Value::Nil)))
    );
}

#[test]
fn malformed_catch_fails_before_evaluating() {
    let malformed = BadArgType("try*".to_string(), "catch clause");
    assert_eq!(run("(def! a 1) (try* (def! a 2) (oops e 1)) a"), Err(malformed.clone()));
    assert_eq!(run("(try* 1 (catch* e))"), Err(malformed.clone()));
    assert_eq!(run("(try* 1 [catch* e 1])"), Err(malformed));
    assert_eq!(
        run("(try* 1 (catch* 2 1))"),
        Err(BadArgType("try*".to_string(), "symbol"))
    );
}

#[test]
fn catch_body_sees_the_enclosing_scope() {
    assert_eq!(
        run("(let* (x 10) (try* (throw 1) (catch* e (+ x (error-cause (error 0 nil 5))))))"),
        Ok(num(15.0))
    );
}

#[test]
fn atoms() {
    assert_eq!(run("(def! x (atom 1)) (reset! x 5) (deref x)"), Ok(num(5.0)));
    assert_eq!(run("(def! x (atom 1)) (swap! x + 2)"), Ok(num(3.0)));
    assert_eq!(run("(def! x (atom 1)) (swap! x (fn* (v) (* v 10))) @x"), Ok(num(10.0)));
    assert_eq!(run("(def! x (atom 1)) (= x x)"), Ok(Value::Boolean(true)));
    assert_eq!(run("(= (atom 1) (atom 1))"), Ok(Value::Boolean(false)));
}

#[test]
fn eval_uses_the_root_frame() {
    assert_eq!(run("(def! x 1) (let* (x 2) (eval 'x))"), Ok(num(1.0)));
    assert_eq!(run("(eval (list + 1 2))"), Ok(num(3.0)));
}

#[test]
fn native_arity_is_checked() {
    assert_eq!(run("(+ 1)"), Err(BadArgc("+".to_string())));
    assert_eq!(run("(+ 1 2 3)"), Err(BadArgc("+".to_string())));
    assert_eq!(run("(list)"), Ok(value("()")));
    assert_eq!(run("(+ 1 \"a\")"), Err(BadArgType("+".to_string(), "number")));
}

#[test]
fn error_values() {
    assert_eq!(run("(error-kind (error \"x\"))"), Ok(Value::string("Error")));
    assert_eq!(run("(error-cause (error \"x\"))"), Ok(Value::Nil));
    assert_eq!(
        run("(error 1 \"Oops\")"),
        Err(BadArgType("error".to_string(), "error kind"))
    );
    assert_eq!(run("(error? (error 1))"), Ok(Value::Boolean(true)));
}

#[test]
fn error_normalization() {
    let e = UnboundVar("x".to_string()).into_error_value();
    assert_eq!(e, Value::error(Value::string("'x' not found"), ErrorKind::ReferenceError, Value::Nil));

    let thrown = Value::error(num(1.0), ErrorKind::TypeError, Value::Nil);
    assert_eq!(Thrown(thrown.clone()).into_error_value(), thrown);

    assert_eq!(
        Thrown(Value::string("s")).into_error_value(),
        Value::error(Value::string("s"), ErrorKind::Error, Value::Nil)
    );
}

#[test]
fn frames() {
    let root = default_env();
    root.borrow_mut().set("x".into(), num(1.0));

    let parameters: Vec<crate::helpers::ImmutableString> =
        vec!["a".into(), "&".into(), "rest".into()];
    let frame = root.child(&parameters, vec![num(1.0), num(2.0), num(3.0)]);

    assert_eq!(frame.borrow().get("a"), Ok(num(1.0)));
    assert_eq!(frame.borrow().get("rest"), Ok(value("(2 3)")));
    assert_eq!(frame.borrow().get("x"), Ok(num(1.0)));
    assert_eq!(frame.borrow().lookup("y"), None);

    assert!(Gc::ptr_eq(&frame.find("x").unwrap(), &root));
    assert!(Gc::ptr_eq(&frame.find("a").unwrap(), &frame));
    assert!(frame.find("y").is_none());
    assert!(Gc::ptr_eq(&frame.root(), &root));

    frame.borrow_mut().set("x".into(), num(5.0));
    assert_eq!(frame.borrow().get("x"), Ok(num(5.0)));
    assert_eq!(root.borrow().get("x"), Ok(num(1.0)));
}
