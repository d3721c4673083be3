//! Filter expression tokenizer using nom.
//!
//! Splits a `_where` expression into tokens on spaces, keeping single-quoted
//! phrases together.
//!
//! ```text
//! string = 'test test' AND boolean = true
//! ──┬─── ┬ ────┬──── ─┬─ ───┬─── ┬ ──┬─
//!   │    │     │      │     │    │   └── literal
//!   │    │     │      │     │    └── comparison
//!   │    │     │      │     └── field
//!   │    │     │      └── logical
//!   │    │     └── quoted literal (quotes dropped)
//!   │    └── comparison
//!   └── field
//! ```
//!
//! Operators are not split out of words: `a=1` is a single token.

use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::opt,
    sequence::{preceded, terminated},
    IResult,
};

/// Tokenize a filter expression. Never fails; empty input gives no tokens.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = input;

    loop {
        let (input, _) = skip_spaces(rest);
        if input.is_empty() {
            break;
        }

        let (input, token) = parse_token(input);
        if !token.is_empty() {
            tokens.push(token);
        }
        rest = input;
    }

    tokens
}

fn skip_spaces(input: &str) -> (&str, &str) {
    let res: IResult<&str, &str> = take_while(|c: char| c == ' ')(input);
    res.unwrap_or((input, ""))
}

/// A bare run followed by an optional quoted part.
///
/// The closing quote ends the token, so `ab'c d'ef` yields `abc d` and
/// then `ef`. An unterminated quote runs to the end of input.
fn parse_token(input: &str) -> (&str, String) {
    let (input, bare) = parse_bare(input).unwrap_or((input, ""));
    let (input, quoted) = opt(parse_quoted)(input).unwrap_or((input, None));

    let mut token = bare.to_string();
    if let Some(quoted) = quoted {
        token.push_str(quoted);
    }
    (input, token)
}

fn parse_bare(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != ' ' && c != '\'')(input)
}

fn parse_quoted(input: &str) -> IResult<&str, &str> {
    preceded(
        char('\''),
        terminated(take_while(|c: char| c != '\''), opt(char('\''))),
    )(input)
}

/// Comparison operators recognised in filters.
pub const COMPARISON_OPERATORS: [&str; 5] = ["<", ">", "<=", ">=", "="];

/// Logical connectives recognised in filters.
pub const LOGICAL_OPERATORS: [&str; 4] = ["and", "AND", "or", "OR"];

pub fn is_comparison(token: &str) -> bool {
    COMPARISON_OPERATORS.contains(&token)
}

pub fn is_logical(token: &str) -> bool {
    LOGICAL_OPERATORS.contains(&token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_tokens() {
        assert_eq!(tokenize("number > 10"), vec!["number", ">", "10"]);
    }

    #[test]
    fn test_quoted_phrase() {
        assert_eq!(
            tokenize("string = 'test test' AND boolean = true"),
            vec!["string", "=", "test test", "AND", "boolean", "=", "true"]
        );
    }

    #[test]
    fn test_consecutive_spaces_collapse() {
        assert_eq!(tokenize("  a   =  b  "), vec!["a", "=", "b"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("    ").is_empty());
    }

    #[test]
    fn test_empty_quotes_emit_nothing() {
        assert_eq!(tokenize("a = ''"), vec!["a", "="]);
    }

    #[test]
    fn test_closing_quote_ends_token() {
        assert_eq!(tokenize("ab'c d'ef"), vec!["abc d", "ef"]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(tokenize("a = 'open ended"), vec!["a", "=", "open ended"]);
    }

    #[test]
    fn test_operators_not_split() {
        assert_eq!(tokenize("a=1"), vec!["a=1"]);
    }

    #[test]
    fn test_operator_tables() {
        assert!(is_comparison("<="));
        assert!(!is_comparison("!="));
        assert!(is_logical("or"));
        assert!(!is_logical("Or"));
    }
}
