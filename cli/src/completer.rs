//! Line-editor integration: tab completion and inline hints.

use std::rc::Rc;

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use traffic_shell_core::Suggestion;

use crate::commands::ShellSpec;

/// Completion helper backed by the command tree.
pub struct ShellHelper {
    spec: Rc<ShellSpec>,
}

impl ShellHelper {
    pub fn new(spec: Rc<ShellSpec>) -> Self {
        Self { spec }
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(&line[..pos]))
    }
}

impl ShellHelper {
    /// Replacement start and candidates for the text before the cursor.
    fn candidates(&self, before: &str) -> (usize, Vec<Pair>) {
        let start = token_start(before);
        let typed = &before[start..];
        let candidates = self
            .spec
            .suggest(before)
            .into_iter()
            .filter(|s| !s.text.is_empty())
            .map(|s| keep_open_quote(s, typed))
            .map(to_pair)
            .collect();
        (start, candidates)
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let partial = &line[token_start(line)..];
        if partial.is_empty() {
            return None;
        }
        match self.spec.suggest(line).as_slice() {
            [only] => only
                .text
                .strip_prefix(partial)
                .filter(|rest| !rest.is_empty())
                .map(String::from),
            _ => None,
        }
    }
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}

/// Quotes a candidate for a token typed with an opening quote, so that
/// replacing the token does not drop the quote.
fn keep_open_quote(mut suggestion: Suggestion, typed: &str) -> Suggestion {
    let Some(open) = typed.strip_prefix('"') else {
        return suggestion;
    };
    if !suggestion.text.starts_with('"') {
        suggestion.text = if suggestion.text == open {
            format!("\"{open}")
        } else {
            format!("\"{}\"", suggestion.text)
        };
    }
    suggestion
}

fn to_pair(suggestion: Suggestion) -> Pair {
    let display = if suggestion.description.is_empty() {
        suggestion.text.clone()
    } else {
        format!("{}  {}", suggestion.text, suggestion.description)
    };
    Pair {
        display,
        replacement: suggestion.text,
    }
}

/// Byte offset where the token under the cursor starts.
///
/// Follows the tokenizer: spaces separate tokens outside quotes, and a quote
/// starts a new token.
pub fn token_start(line: &str) -> usize {
    let mut start = 0;
    let mut in_quote = false;
    let mut after_close = false;

    for (i, c) in line.char_indices() {
        match c {
            '"' => {
                if in_quote {
                    after_close = true;
                } else {
                    start = i;
                }
                in_quote = !in_quote;
            }
            ' ' if !in_quote => {
                start = i + 1;
                after_close = false;
            }
            _ => {
                if after_close {
                    start = i;
                    after_close = false;
                }
            }
        }
    }
    start
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use traffic_shell_db::{Catalog, FileStore};

    use super::*;
    use crate::commands::build_spec;

    fn helper() -> ShellHelper {
        let catalog = Rc::new(RefCell::new(Catalog::new(FileStore::seeded())));
        ShellHelper::new(Rc::new(build_spec(&catalog)))
    }

    fn replacements(line: &str) -> (usize, Vec<String>) {
        let (start, pairs) = helper().candidates(line);
        (start, pairs.into_iter().map(|p| p.replacement).collect())
    }

    #[test]
    fn test_placeholder_keeps_open_quote() {
        let line = r#"create platform cloud "fre"#;
        let (start, texts) = replacements(line);
        assert_eq!(&line[start..], r#""fre"#);
        assert_eq!(texts, vec![r#""fre"#]);
    }

    #[test]
    fn test_provider_value_is_quoted_inside_open_quote() {
        let (_, texts) = replacements(r#"show platform "akam"#);
        assert_eq!(texts, vec![r#""Akamai""#]);
        let (_, texts) = replacements(r#"show platform "cloudfr"#);
        assert_eq!(texts, vec![r#""Amazon CloudFront""#]);
    }

    #[test]
    fn test_unquoted_tokens_are_untouched() {
        let (start, texts) = replacements("create pl");
        assert_eq!(start, 7);
        assert_eq!(texts, vec!["platform"]);
        assert!(replacements("create platform cloud ").1.is_empty());
    }

    #[test]
    fn test_token_start() {
        assert_eq!(token_start(""), 0);
        assert_eq!(token_start("cre"), 0);
        assert_eq!(token_start("create pl"), 7);
        assert_eq!(token_start("create "), 7);
        assert_eq!(token_start(r#"show platform "Amazon EC"#), 14);
        assert_eq!(token_start(r#"show platform "Amazon EC2""#), 14);
        assert_eq!(token_start(r#"x "a"b"#), 5);
    }

    #[test]
    fn test_pair_display() {
        let pair = to_pair(Suggestion::new("-filter", "Regex filter"));
        assert_eq!(pair.replacement, "-filter");
        assert_eq!(pair.display, "-filter  Regex filter");
        assert_eq!(to_pair(Suggestion::new("EU", "")).display, "EU");
    }
}
