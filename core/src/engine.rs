//! Strict parsing and completion over a [`CommandSpec`].
//!
//! Both entry points drive the same [`Cursor`]: every token is first
//! classified into the [`Slot`] it would fill at the current position and then
//! applied. [`CommandSpec::parse`] applies every token and fails on the first
//! error. [`CommandSpec::suggest`] applies every completed token and turns the
//! slot of the token still being typed (or of the fresh token after trailing
//! whitespace) into suggestions, returning nothing where `parse` would fail.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{ParseError, Result};
use crate::suggest::filter_has_prefix;
use crate::tokenize::tokenize;
use crate::types::{
    CommandFragment, CommandSpec, NAMED_ARG_MARKER, NamedArg, ParsedCommand, PositionalArg,
    Suggestion,
};

/// What the next token means at the cursor's position.
#[derive(Debug, Clone, Copy)]
enum Slot<'a> {
    /// Still descending: the token must name a sub-command.
    Command,
    /// The token fills a positional argument.
    Positional(&'a PositionalArg),
    /// The token must be a marker-prefixed argument name.
    NamedName,
    /// The token is the value of a named argument.
    NamedValue { name: &'a str, arg: &'a NamedArg },
}

fn is_marked(token: &str) -> bool {
    token.starts_with(NAMED_ARG_MARKER)
}

/// Descent state shared by parsing and completion.
struct Cursor<'a, C, H> {
    fragment: &'a CommandFragment<C, H>,
    args: BTreeMap<String, String>,
    next_positional: usize,
    positional_done: bool,
    awaiting: Option<(&'a str, &'a NamedArg)>,
    valid: BTreeMap<&'a str, &'a NamedArg>,
    supplied: BTreeSet<&'a str>,
    handler: Option<&'a H>,
}

impl<'a, C, H> Cursor<'a, C, H> {
    fn new(root: &'a CommandFragment<C, H>) -> Self {
        Self {
            fragment: root,
            args: BTreeMap::new(),
            next_positional: 0,
            positional_done: false,
            awaiting: None,
            valid: BTreeMap::new(),
            supplied: BTreeSet::new(),
            handler: None,
        }
    }

    fn pending_positional(&self) -> Option<&'a PositionalArg> {
        if self.positional_done {
            return None;
        }
        self.fragment.positional.get(self.next_positional)
    }

    fn classify(&self, token: &str) -> Slot<'a> {
        if !self.fragment.is_terminal() {
            return Slot::Command;
        }
        if let Some((name, arg)) = self.awaiting {
            return Slot::NamedValue { name, arg };
        }
        match self.pending_positional() {
            // A marker token may skip an optional positional straight into
            // the named arguments.
            Some(arg) if !(is_marked(token) && arg.optional) => Slot::Positional(arg),
            _ => Slot::NamedName,
        }
    }

    fn apply(&mut self, slot: Slot<'a>, token: &str, line: &str) -> Result<()> {
        match slot {
            Slot::Command => {
                let child = self
                    .fragment
                    .sub
                    .get(token.to_lowercase().as_str())
                    .ok_or_else(|| ParseError::UnrecognizedToken {
                        token: token.to_string(),
                        line: line.to_string(),
                    })?;
                self.descend(child);
            }
            Slot::Positional(arg) => {
                if is_marked(token) {
                    let name = token.trim_start_matches(NAMED_ARG_MARKER);
                    // A known argument name here means the positional value
                    // was left out.
                    return Err(if self.valid.contains_key(name) {
                        ParseError::IncompleteCommand {
                            missing: format!("expecting positional argument '{}'", arg.name),
                        }
                    } else {
                        ParseError::UnexpectedNamedArg {
                            token: token.to_string(),
                            expected: arg.name.clone(),
                        }
                    });
                }
                self.args.insert(arg.name.clone(), token.to_string());
                self.next_positional += 1;
            }
            Slot::NamedName => {
                if !is_marked(token) {
                    return Err(ParseError::ExpectedNamedArg {
                        token: token.to_string(),
                    });
                }
                self.positional_done = true;
                let wanted = token.trim_start_matches(NAMED_ARG_MARKER);
                let (name, arg) = self
                    .valid
                    .get_key_value(wanted)
                    .map(|(name, arg)| (*name, *arg))
                    .ok_or_else(|| ParseError::UnknownArgument {
                        name: wanted.to_string(),
                    })?;
                self.supplied.insert(name);
                if arg.is_flag {
                    self.args.insert(name.to_string(), String::new());
                } else {
                    self.awaiting = Some((name, arg));
                }
            }
            Slot::NamedValue { name, .. } => {
                if is_marked(token) {
                    return Err(ParseError::IncompleteArgument {
                        name: name.to_string(),
                    });
                }
                self.args.insert(name.to_string(), token.to_string());
                self.awaiting = None;
            }
        }
        Ok(())
    }

    fn descend(&mut self, child: &'a CommandFragment<C, H>) {
        self.fragment = child;
        self.valid
            .extend(child.named.iter().map(|(name, arg)| (name.as_str(), arg)));
        if let Some(handler) = child.handler.as_ref() {
            self.handler = Some(handler);
        }
    }

    fn finish(self) -> Result<ParsedCommand<C, H>>
    where
        C: Clone,
        H: Clone,
    {
        if let Some(arg) = self.pending_positional().filter(|arg| !arg.optional) {
            return Err(ParseError::IncompleteCommand {
                missing: format!("expecting positional argument '{}'", arg.name),
            });
        }
        if let Some((name, _)) = self.awaiting {
            return Err(ParseError::IncompleteArgument {
                name: name.to_string(),
            });
        }
        let Some(code) = self.fragment.code.clone() else {
            let words: Vec<&str> = self.fragment.sub.keys().map(String::as_str).collect();
            return Err(ParseError::IncompleteCommand {
                missing: format!("expecting one of: {}", words.join(", ")),
            });
        };

        Ok(ParsedCommand {
            code,
            args: self.args,
            handler: self.handler.cloned(),
        })
    }

    /// Candidates for a token that is still being typed.
    fn complete(&self, slot: Slot<'a>, token: &str) -> Vec<Suggestion> {
        match slot {
            Slot::Command => filter_has_prefix(self.command_suggestions(), token, true),
            // Quoted multi-word values cannot be completed live.
            Slot::Positional(_) | Slot::NamedValue { .. } if token.contains(' ') => Vec::new(),
            Slot::Positional(arg) => match &arg.suggest {
                Some(provider) => provider.suggest(token),
                None => vec![arg.placeholder(token)],
            },
            Slot::NamedName => filter_has_prefix(self.named_suggestions(), token, true),
            Slot::NamedValue { .. } if is_marked(token) => Vec::new(),
            Slot::NamedValue { name, arg } => match &arg.suggest {
                Some(provider) => provider.suggest(token),
                None => vec![arg.placeholder(name, token)],
            },
        }
    }

    /// Candidates for the fresh token after trailing whitespace.
    fn upcoming(&self) -> Vec<Suggestion> {
        if !self.fragment.is_terminal() {
            return self.command_suggestions();
        }
        if let Some((name, arg)) = self.awaiting {
            return match &arg.suggest {
                Some(provider) => provider.suggest(""),
                None => vec![arg.placeholder(name, "")],
            };
        }
        if let Some(arg) = self.pending_positional() {
            return vec![arg.placeholder("")];
        }
        self.named_suggestions()
    }

    fn command_suggestions(&self) -> Vec<Suggestion> {
        self.fragment
            .sub
            .iter()
            .map(|(word, child)| Suggestion::new(word.as_str(), child.description.as_str()))
            .collect()
    }

    fn named_suggestions(&self) -> Vec<Suggestion> {
        self.valid
            .iter()
            .filter(|(name, _)| !self.supplied.contains(*name))
            .map(|(name, arg)| {
                Suggestion::new(
                    format!("{NAMED_ARG_MARKER}{name}"),
                    arg.description.as_str(),
                )
            })
            .collect()
    }
}

impl<C, H> CommandSpec<C, H> {
    /// Parses a line into exactly one complete command.
    ///
    /// Command words match case-insensitively; argument names match exactly.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] describing the first token (or the end of
    /// input) that prevents resolution.
    ///
    /// # Examples
    ///
    /// ```
    /// use traffic_shell_core::{CommandFragment, CommandSpec, NamedArg, ParseError, PositionalArg};
    ///
    /// let spec: CommandSpec<&str> = CommandSpec::new().with_command(
    ///     "show",
    ///     CommandFragment::new("Show a resource").with_sub(
    ///         "zone",
    ///         CommandFragment::new("Show a DNS zone")
    ///             .with_code("show-zone")
    ///             .with_positional(PositionalArg::required("name", "Zone domain name"))
    ///             .with_named("raw", NamedArg::flag("Print raw JSON")),
    ///     ),
    /// );
    ///
    /// let cmd = spec.parse("SHOW zone example.com -raw").unwrap();
    /// assert_eq!(cmd.code, "show-zone");
    /// assert_eq!(cmd.arg("name"), Some("example.com"));
    /// assert_eq!(cmd.arg("raw"), Some(""));
    ///
    /// assert!(matches!(spec.parse("show"), Err(ParseError::IncompleteCommand { .. })));
    /// ```
    pub fn parse(&self, line: &str) -> Result<ParsedCommand<C, H>>
    where
        C: Clone,
        H: Clone,
    {
        let tokens = tokenize(line);
        if tokens.is_empty() {
            return Err(ParseError::EmptyCommand);
        }

        let mut cursor = Cursor::new(&self.root);
        for token in &tokens.tokens {
            let slot = cursor.classify(token);
            cursor.apply(slot, token, line)?;
        }
        cursor.finish()
    }

    /// Suggests completions for a partially typed line.
    ///
    /// Never fails; an unresolvable line yields an empty list. Command and
    /// argument names come back sorted by text, provider results keep the
    /// provider's order.
    ///
    /// # Examples
    ///
    /// ```
    /// use traffic_shell_core::{CommandFragment, CommandSpec};
    ///
    /// let spec: CommandSpec<u8> = CommandSpec::new()
    ///     .with_command("exit", CommandFragment::new("Exit").with_code(1))
    ///     .with_command("delete", CommandFragment::new("Delete").with_code(2));
    ///
    /// let texts: Vec<String> = spec.suggest("").into_iter().map(|s| s.text).collect();
    /// assert_eq!(texts, vec!["delete", "exit"]);
    /// assert_eq!(spec.suggest("ex")[0].text, "exit");
    /// assert!(spec.suggest("nope ").is_empty());
    /// ```
    pub fn suggest(&self, line: &str) -> Vec<Suggestion> {
        let tokens = tokenize(line);
        let in_progress = (!tokens.trailing_whitespace)
            .then(|| tokens.len().checked_sub(1))
            .flatten();

        let mut cursor = Cursor::new(&self.root);
        for (i, token) in tokens.tokens.iter().enumerate() {
            let slot = cursor.classify(token);
            if in_progress == Some(i) {
                return cursor.complete(slot, token);
            }
            if let Err(e) = cursor.apply(slot, token, line) {
                debug!(line = ?line, error = %e, "No suggestions past unresolvable token");
                return Vec::new();
            }
        }
        cursor.upcoming()
    }
}
