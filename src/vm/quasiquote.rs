use super::keywords::{CONCAT, CONS, QUOTE, SPLICE_UNQUOTE, UNQUOTE, VEC};
use super::Value;

fn call(name: &str, args: Vec<Value>) -> Value {
    let mut items = vec![Value::symbol(name)];
    items.extend(args);
    Value::list(items)
}

fn second(form: &Value) -> Value {
    form.items()
        .and_then(|items| items.get(1))
        .cloned()
        .unwrap_or(Value::Nil)
}

/// Rewrites a quasiquoted template into plain `cons`/`concat`/`vec`/`quote`
/// calls. Nothing is evaluated here.
pub fn quasiquote(ast: &Value) -> Value {
    match *ast {
        Value::Symbol(..) | Value::Map(..) => call(QUOTE, vec![ast.clone()]),
        Value::List(..) if ast.starts_with_symbol(UNQUOTE) => second(ast),
        Value::List(ref items, _) | Value::Vector(ref items, _) => {
            let mut result = Value::list(vec![]);
            for item in items.iter().rev() {
                result = if item.starts_with_symbol(SPLICE_UNQUOTE) {
                    call(CONCAT, vec![second(item), result])
                } else {
                    call(CONS, vec![quasiquote(item), result])
                };
            }
            if ast.is_vector() {
                call(VEC, vec![result])
            } else {
                result
            }
        }
        _ => ast.clone(),
    }
}

#[cfg(test)]
mod test {
    use super::quasiquote;
    use crate::reader::read_str;

    fn expands_to(template: &str, expansion: &str) {
        let template = read_str(template).unwrap();
        assert_eq!(quasiquote(&template), read_str(expansion).unwrap());
    }

    #[test]
    fn atoms() {
        expands_to("a", "(quote a)");
        expands_to("{:a 1}", "(quote {:a 1})");
        expands_to("1", "1");
        expands_to("\"s\"", "\"s\"");
        expands_to("nil", "nil");
    }

    #[test]
    fn unquote() {
        expands_to("(unquote x)", "x");
        expands_to("(1 (unquote x))", "(cons 1 (cons x ()))");
    }

    #[test]
    fn splice() {
        expands_to(
            "(1 (splice-unquote xs) 2)",
            "(cons 1 (concat xs (cons 2 ())))",
        );
    }

    #[test]
    fn vectors() {
        expands_to("[a (unquote b)]", "(vec (cons (quote a) (cons b ())))");
        expands_to("[]", "(vec ())");
    }

    #[test]
    fn nested() {
        expands_to("((a))", "(cons (cons (quote a) ()) ())");
    }
}
