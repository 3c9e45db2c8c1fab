//! Split source text into tokens
use regex::Regex;
use std::sync::LazyLock;


// Splice marker, structural characters, strings (possibly unterminated),
// comments, and maximal runs of anything else
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"[\s,]*(~@|[\[\]{}()'`~^@]|"(?:\\.|[^\\"])*"?|;.*|//.*|[^\s\[\]{}('"`,;)]*)"#,
    )
    .expect("token pattern is valid")
});

fn is_comment(token: &str) -> bool {
    token.starts_with(';') || token.starts_with("//")
}

/// Returns the tokens of `source` in order, with comments and empty
/// matches removed. Whitespace and commas only separate tokens.
pub fn tokenize(source: &str) -> Vec<String> {
    TOKEN
        .captures_iter(source)
        .filter_map(|captures| captures.get(1))
        .map(|token| token.as_str())
        .filter(|token| !token.is_empty() && !is_comment(token))
        .map(str::to_string)
        .collect()
}
