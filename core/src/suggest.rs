//! Suggestion list filters.
//!
//! Used by the completion walk for command and argument names, and by
//! suggestion providers to narrow their own candidate lists.

use crate::Suggestion;

/// Keeps suggestions whose text starts with `prefix`.
///
/// # Examples
///
/// ```
/// use traffic_shell_core::{Suggestion, filter_has_prefix};
///
/// let all = vec![Suggestion::new("create", ""), Suggestion::new("exit", "")];
/// let hits = filter_has_prefix(all, "CR", true);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].text, "create");
/// ```
pub fn filter_has_prefix(
    suggestions: impl IntoIterator<Item = Suggestion>,
    prefix: &str,
    ignore_case: bool,
) -> Vec<Suggestion> {
    if ignore_case {
        let prefix = prefix.to_lowercase();
        suggestions
            .into_iter()
            .filter(|s| s.text.to_lowercase().starts_with(&prefix))
            .collect()
    } else {
        suggestions
            .into_iter()
            .filter(|s| s.text.starts_with(prefix))
            .collect()
    }
}

/// Keeps suggestions whose text contains `needle`.
///
/// # Examples
///
/// ```
/// use traffic_shell_core::{Suggestion, filter_contains};
///
/// let all = vec![
///     Suggestion::quoted("Amazon EC2 - US East", ""),
///     Suggestion::quoted("Azure West", ""),
/// ];
/// assert_eq!(filter_contains(all, "ec2", true).len(), 1);
/// ```
pub fn filter_contains(
    suggestions: impl IntoIterator<Item = Suggestion>,
    needle: &str,
    ignore_case: bool,
) -> Vec<Suggestion> {
    if ignore_case {
        let needle = needle.to_lowercase();
        suggestions
            .into_iter()
            .filter(|s| s.text.to_lowercase().contains(&needle))
            .collect()
    } else {
        suggestions
            .into_iter()
            .filter(|s| s.text.contains(needle))
            .collect()
    }
}

/// Sorts suggestions by text.
pub fn sort_suggestions(mut suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    suggestions.sort_by(|a, b| a.text.cmp(&b.text));
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(list: &[Suggestion]) -> Vec<&str> {
        list.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_prefix_case_sensitive() {
        let all = vec![Suggestion::new("-shortName", ""), Suggestion::new("-Short", "")];
        assert_eq!(texts(&filter_has_prefix(all, "-short", false)), vec!["-shortName"]);
    }

    #[test]
    fn test_prefix_preserves_order() {
        let all = vec![
            Suggestion::new("zeta", ""),
            Suggestion::new("zap", ""),
            Suggestion::new("alpha", ""),
        ];
        assert_eq!(texts(&filter_has_prefix(all, "z", true)), vec!["zeta", "zap"]);
    }

    #[test]
    fn test_contains_case_insensitive() {
        let all = vec![
            Suggestion::new("\"Amazon EC2 - EU\"", ""),
            Suggestion::new("\"Google Cloud\"", ""),
        ];
        assert_eq!(texts(&filter_contains(all, "EU", true)), vec!["\"Amazon EC2 - EU\""]);
    }

    #[test]
    fn test_sort_by_text() {
        let sorted = sort_suggestions(vec![Suggestion::new("b", ""), Suggestion::new("a", "")]);
        assert_eq!(texts(&sorted), vec!["a", "b"]);
    }
}
