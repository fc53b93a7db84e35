//! Line tokenizer with double-quote grouping.
//!
//! Splits a raw input line into words. A double quote toggles quoted mode,
//! inside which spaces are literal. Closing a quote always emits the
//! accumulated token, so `""` yields an explicit empty token. The quote
//! character itself never appears in token content and an unterminated quote
//! simply runs to the end of the line.

/// Result of tokenizing one input line.
///
/// # Examples
///
/// ```
/// use traffic_shell_core::tokenize;
///
/// let t = tokenize(r#"create platform cloud "west zone" "#);
/// assert_eq!(t.tokens, vec!["create", "platform", "cloud", "west zone"]);
/// assert!(t.trailing_whitespace);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    /// Tokens in input order, quotes removed.
    pub tokens: Vec<String>,
    /// `true` when the line is outside a quote and ends with a space, i.e.
    /// the user is about to start a new word rather than still typing one.
    pub trailing_whitespace: bool,
}

impl Tokens {
    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` when the line produced no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Tokenizes a line. Never fails.
///
/// # Examples
///
/// ```
/// use traffic_shell_core::tokenize;
///
/// assert_eq!(tokenize(r#"cmd """#).tokens, vec!["cmd", ""]);
/// assert!(!tokenize("cmd -arg").trailing_whitespace);
/// assert!(tokenize("cmd -arg ").trailing_whitespace);
/// ```
pub fn tokenize(line: &str) -> Tokens {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for c in line.chars() {
        match c {
            '"' => {
                if in_quote || !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                in_quote = !in_quote;
            }
            ' ' if !in_quote => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    Tokens {
        tokens,
        trailing_whitespace: !in_quote && line.ends_with(' '),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(line: &str, expected: &[&str], ws: bool) {
        let t = tokenize(line);
        assert_eq!(t.tokens, expected, "tokens for {line:?}");
        assert_eq!(t.trailing_whitespace, ws, "whitespace flag for {line:?}");
    }

    #[test]
    fn test_tokenize_table() {
        check("", &[], false);
        check("exit", &["exit"], false);
        check(r#"cmd "a space""#, &["cmd", "a space"], false);
        check("cmd -arg", &["cmd", "-arg"], false);
        check("cmd  -arg", &["cmd", "-arg"], false);
        check(" cmd -arg", &["cmd", "-arg"], false);
        check("cmd -arg ", &["cmd", "-arg"], true);
        check(r#"cmd "ff "#, &["cmd", "ff "], false);
    }

    #[test]
    fn test_empty_quotes_produce_empty_token() {
        check(r#"cmd """#, &["cmd", ""], false);
        check(r#"cmd "" -x"#, &["cmd", "", "-x"], false);
    }

    #[test]
    fn test_quote_flushes_pending_word() {
        check(r#"ab"cd"ef"#, &["ab", "cd", "ef"], false);
    }

    #[test]
    fn test_whitespace_only_line() {
        check("   ", &[], true);
    }

    #[test]
    fn test_trailing_space_inside_quote_is_not_trailing_whitespace() {
        check(r#"show zone "my "#, &["show", "zone", "my "], false);
    }

    #[test]
    fn test_join_and_retokenize_round_trip() {
        let words = ["create", "alert", "origin-1", "-emails", "ops@example.com"];
        let line = words.join(" ");
        assert_eq!(tokenize(&line).tokens, words);
    }

    mod props {
        use proptest::prelude::*;

        use super::super::tokenize;

        proptest! {
            #[test]
            fn test_round_trip_plain_words(
                words in prop::collection::vec("[A-Za-z0-9@._=-]{1,10}", 0..8)
            ) {
                let tokens = tokenize(&words.join(" "));
                prop_assert_eq!(tokens.tokens, words);
                prop_assert!(!tokens.trailing_whitespace);
            }

            #[test]
            fn test_round_trip_quoted_words(
                words in prop::collection::vec("[a-z -]{0,8}", 1..6)
            ) {
                let line: Vec<String> = words.iter().map(|w| format!("\"{w}\"")).collect();
                let tokens = tokenize(&line.join(" "));
                prop_assert_eq!(tokens.tokens, words);
            }

            #[test]
            fn test_trailing_space_is_reported(
                words in prop::collection::vec("[a-z]{1,6}", 1..5)
            ) {
                let line = format!("{} ", words.join(" "));
                prop_assert!(tokenize(&line).trailing_whitespace);
            }

            #[test]
            fn test_never_panics(line in "\\PC{0,40}") {
                let tokens = tokenize(&line);
                prop_assert!(tokens.tokens.iter().all(|t| !t.contains('"')));
            }
        }
    }
}
