//! Render values as text
use crate::vm::map::key_value;
use crate::vm::Value;

fn escape(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '"' => vec!['\\', '"'],
            '\\' => vec!['\\', '\\'],
            '\n' => vec!['\\', 'n'],
            c => vec![c],
        })
        .collect()
}

fn join(values: &[Value], readably: bool) -> String {
    values
        .iter()
        .map(|v| print_string(v, readably))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Textual form of `value`. In readable mode strings are quoted and
/// escaped, so that the reader gives back an equal value.
pub fn print_string(value: &Value, readably: bool) -> String {
    match *value {
        Value::Nil => "nil".to_owned(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => format!("{}", n),
        Value::String(ref s) if readably => format!("\"{}\"", escape(s)),
        Value::String(ref s) => s.to_string(),
        Value::Symbol(ref s) => s.to_string(),
        Value::Keyword(ref k) => format!("{}:", k),
        Value::List(ref items, _) => format!("({})", join(items, readably)),
        Value::Vector(ref items, _) => format!("[{}]", join(items, readably)),
        Value::Map(ref map, _) => {
            let flat: Vec<String> = map
                .iter()
                .flat_map(|(k, v)| {
                    vec![
                        print_string(&key_value(k), readably),
                        print_string(v, readably),
                    ]
                })
                .collect();
            format!("{{{}}}", flat.join(" "))
        }
        Value::Function(ref f, _) if f.is_macro => "#<macro>".to_owned(),
        Value::Function(..) => "#<fn>".to_owned(),
        Value::Atom(ref cell) => format!("(atom {})", print_string(&cell.borrow(), readably)),
        Value::Error(ref error) => print_string(&error.payload, readably),
    }
}
