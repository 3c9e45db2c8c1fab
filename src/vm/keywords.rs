pub const IF: &str = "if";
pub const DO: &str = "do";
pub const FN_STAR: &str = "fn*";
pub const FUNCTION: &str = "function";
pub const ARROW: &str = "=>";
pub const DEF_BANG: &str = "def!";
pub const VAR: &str = "var";
pub const GLOBAL_THIS: &str = "globalThis";
pub const LET_STAR: &str = "let*";
pub const LET: &str = "let";
pub const CONST: &str = "const";
pub const TRY_STAR: &str = "try*";
pub const TRY: &str = "try";
pub const CATCH_STAR: &str = "catch*";
pub const CATCH: &str = "catch";
pub const QUOTE: &str = "quote";
pub const QUASIQUOTE: &str = "quasiquote";
pub const QUASIQUOTE_EXPAND: &str = "quasiquoteexpand";
pub const UNQUOTE: &str = "unquote";
pub const SPLICE_UNQUOTE: &str = "splice-unquote";
pub const DEFMACRO_BANG: &str = "defmacro!";
pub const MACROEXPAND: &str = "macroexpand";

// Functions emitted by quasiquote expansion
pub const CONS: &str = "cons";
pub const CONCAT: &str = "concat";
pub const VEC: &str = "vec";
