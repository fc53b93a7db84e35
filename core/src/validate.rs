//! Command tree validation.
//!
//! Catches trees that would make commands unreachable or ambiguous before
//! they reach the parser: words that can never match after case folding,
//! non-terminal fragments with nowhere to go, argument names that collide or
//! look like markers, and required positionals declared after optional ones.
//!
//! # Examples
//!
//! ```
//! use traffic_shell_core::*;
//!
//! let spec: CommandSpec<u8> = CommandSpec::new()
//!     .with_command("exit", CommandFragment::new("Exit").with_code(1));
//! assert!(validate_spec(&spec).is_empty());
//!
//! // Invalid: "list" is neither a command nor has sub-commands
//! let bad: CommandSpec<u8> = CommandSpec::new()
//!     .with_command("list", CommandFragment::new("List things"));
//! assert!(!validate_spec(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::types::{CommandFragment, CommandSpec, NAMED_ARG_MARKER};

/// Structural problems in a command tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A command word is empty or whitespace-only.
    #[error("empty command word under '{0}'")]
    EmptyWord(String),
    /// A command word has uppercase characters and can never match.
    #[error("command word must be lowercase: {0}")]
    UppercaseWord(String),
    /// A fragment is not a command and has no sub-commands.
    #[error("fragment is neither a command nor has sub-commands: {0}")]
    DeadEndFragment(String),
    /// An argument name is empty, has whitespace or starts with the marker.
    #[error("invalid argument name '{name}' at: {path}")]
    InvalidArgName { path: String, name: String },
    /// A required positional follows an optional one.
    #[error("required positional '{name}' follows an optional one at: {path}")]
    RequiredAfterOptional { path: String, name: String },
    /// An argument name is declared twice on the same command path.
    #[error("duplicate argument '{name}' at: {path}")]
    DuplicateArgument { path: String, name: String },
}

/// Validates a command tree, returning every problem found.
///
/// # Examples
///
/// ```
/// use traffic_shell_core::*;
///
/// let spec: CommandSpec<u8> = CommandSpec::new().with_command(
///     "delete",
///     CommandFragment::new("Delete")
///         .with_code(1)
///         .with_positional(PositionalArg::optional("name", "Name"))
///         .with_positional(PositionalArg::required("id", "Id")),
/// );
/// let errors = validate_spec(&spec);
/// assert!(errors.iter().any(|e| matches!(e, ValidationError::RequiredAfterOptional { .. })));
/// ```
pub fn validate_spec<C, H>(spec: &CommandSpec<C, H>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut path = Vec::new();
    validate_fragments(&spec.root, &mut path, &HashSet::new(), &mut errors);
    errors
}

fn validate_fragments<'a, C, H>(
    fragment: &'a CommandFragment<C, H>,
    path: &mut Vec<&'a str>,
    inherited: &HashSet<&'a str>,
    errors: &mut Vec<ValidationError>,
) {
    for (word, child) in &fragment.sub {
        if word.trim().is_empty() {
            errors.push(ValidationError::EmptyWord(display_path(path)));
            continue;
        }
        if word.to_lowercase() != *word {
            errors.push(ValidationError::UppercaseWord(word.clone()));
        }

        path.push(word.as_str());
        let here = display_path(path);

        if !child.is_terminal() && child.sub.is_empty() {
            errors.push(ValidationError::DeadEndFragment(here.clone()));
        }

        // Redeclaring an inherited named arg overrides it.
        let mut names = inherited.clone();
        for name in child.named.keys() {
            check_name(&here, name, errors);
            names.insert(name.as_str());
        }

        let mut seen_optional = false;
        for arg in &child.positional {
            check_name(&here, &arg.name, errors);
            if !names.insert(arg.name.as_str()) {
                errors.push(ValidationError::DuplicateArgument {
                    path: here.clone(),
                    name: arg.name.clone(),
                });
            }
            if arg.optional {
                seen_optional = true;
            } else if seen_optional {
                errors.push(ValidationError::RequiredAfterOptional {
                    path: here.clone(),
                    name: arg.name.clone(),
                });
            }
        }

        // Positional names are per-fragment; only named args flow down.
        let mut inherited_here = inherited.clone();
        inherited_here.extend(child.named.keys().map(String::as_str));
        validate_fragments(child, path, &inherited_here, errors);
        path.pop();
    }
}

fn check_name(path: &str, name: &str, errors: &mut Vec<ValidationError>) {
    if name.is_empty() || name.starts_with(NAMED_ARG_MARKER) || name.chars().any(char::is_whitespace)
    {
        errors.push(ValidationError::InvalidArgName {
            path: path.to_string(),
            name: name.to_string(),
        });
    }
}

fn display_path(path: &[&str]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(" ")
    }
}
