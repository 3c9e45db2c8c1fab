use std::rc::Rc;

/// Shared, never-mutated string used for symbols, keywords and string values
pub type ImmutableString = Rc<str>;

//
// Macros
//
macro_rules! check {
    ($check:expr, $err:expr) => (
        if !$check {
            return Err($err);
        }
    )
}

// Extract the payload of a `Value` variant or bail out with a type error
macro_rules! expect_variant {
    ($value:expr, $pattern:pat => $out:expr, $name:expr, $expected:expr) => (
        match $value {
            $pattern => $out,
            _ => return Err(ExecutionError::BadArgType($name.to_string(), $expected)),
        }
    )
}

macro_rules! one_of {
    ($x:expr, [$c:expr]) => ($x == $c);
    ($x:expr, [ $c:expr, $( $d:expr ),* ]) => (
        $x == $c || one_of!($x, [$( $d ),* ])
    )
}
