//! Command tree type definitions.
//!
//! A [`CommandSpec`] is a tree of [`CommandFragment`]s keyed by lowercase
//! command word. Fragments carrying a code are complete commands; they may
//! declare [`PositionalArg`]s and [`NamedArg`]s. Named arguments declared on
//! an ancestor stay valid for every descendant.
//!
//! The tree is built once by the embedding application and only borrowed by
//! [`parse`](CommandSpec::parse) and [`suggest`](CommandSpec::suggest).

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Prefix that introduces a named argument on the command line.
pub const NAMED_ARG_MARKER: char = '-';

/// A completion candidate.
///
/// # Examples
///
/// ```
/// use traffic_shell_core::Suggestion;
///
/// let s = Suggestion::quoted("Amazon EC2 - US East", "cloud platform");
/// assert_eq!(s.text, "\"Amazon EC2 - US East\"");
/// assert_eq!(Suggestion::quoted("plain", "").text, "plain");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Text to insert, already quoted when it contains whitespace.
    pub text: String,
    /// Human-readable description shown beside the text.
    pub description: String,
}

impl Suggestion {
    /// Creates a suggestion using `text` verbatim.
    pub fn new(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: description.into(),
        }
    }

    /// Creates a suggestion, wrapping `text` in double quotes if it contains
    /// whitespace so that it re-tokenizes as a single word.
    pub fn quoted(text: &str, description: impl Into<String>) -> Self {
        let text = if text.chars().any(char::is_whitespace) {
            format!("\"{text}\"")
        } else {
            text.to_string()
        };
        Self {
            text,
            description: description.into(),
        }
    }
}

/// Supplies live completion candidates for one argument.
///
/// The engine hands over the partial text the user is typing and returns the
/// provider's list unchanged, preserving its order. Closures of the form
/// `Fn(&str) -> Vec<Suggestion>` implement this trait.
pub trait SuggestProvider {
    /// Returns candidates for `partial`.
    fn suggest(&self, partial: &str) -> Vec<Suggestion>;
}

impl<F> SuggestProvider for F
where
    F: Fn(&str) -> Vec<Suggestion>,
{
    fn suggest(&self, partial: &str) -> Vec<Suggestion> {
        self(partial)
    }
}

/// Shared handle to a [`SuggestProvider`].
pub type Provider = Rc<dyn SuggestProvider>;

/// A positional argument, matched strictly left to right after the command.
#[derive(Clone)]
pub struct PositionalArg {
    /// Argument name, used as the key in [`ParsedCommand::args`].
    pub name: String,
    /// Description shown in placeholder suggestions.
    pub description: String,
    /// Optional arguments may be skipped by starting the named arguments.
    pub optional: bool,
    /// Live value completion.
    pub suggest: Option<Provider>,
}

impl PositionalArg {
    /// Creates a required positional argument.
    ///
    /// # Examples
    ///
    /// ```
    /// use traffic_shell_core::PositionalArg;
    ///
    /// let arg = PositionalArg::required("name", "Name of platform");
    /// assert!(!arg.optional);
    /// ```
    pub fn required(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            optional: false,
            suggest: None,
        }
    }

    /// Creates an optional positional argument.
    pub fn optional(name: &str, description: &str) -> Self {
        Self {
            optional: true,
            ..Self::required(name, description)
        }
    }

    /// Attaches a value provider.
    pub fn with_suggest(mut self, provider: impl SuggestProvider + 'static) -> Self {
        self.suggest = Some(Rc::new(provider));
        self
    }

    pub(crate) fn placeholder(&self, text: &str) -> Suggestion {
        Suggestion::new(text, format!("<{}> {}", self.name, self.description))
    }
}

impl fmt::Debug for PositionalArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionalArg")
            .field("name", &self.name)
            .field("optional", &self.optional)
            .field("suggest", &self.suggest.is_some())
            .finish()
    }
}

/// A named argument, written as `-name value` (or `-name` for flags).
#[derive(Clone)]
pub struct NamedArg {
    /// Description shown in suggestions.
    pub description: String,
    /// Live value completion.
    pub suggest: Option<Provider>,
    /// Flags take no value; their presence maps to the empty string.
    pub is_flag: bool,
}

impl NamedArg {
    /// Creates a named argument that takes a value.
    pub fn value(description: &str) -> Self {
        Self {
            description: description.to_string(),
            suggest: None,
            is_flag: false,
        }
    }

    /// Creates a flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use traffic_shell_core::NamedArg;
    ///
    /// assert!(NamedArg::flag("Skip confirmation").is_flag);
    /// assert!(!NamedArg::value("Regex filter").is_flag);
    /// ```
    pub fn flag(description: &str) -> Self {
        Self {
            is_flag: true,
            ..Self::value(description)
        }
    }

    /// Attaches a value provider.
    pub fn with_suggest(mut self, provider: impl SuggestProvider + 'static) -> Self {
        self.suggest = Some(Rc::new(provider));
        self
    }

    pub(crate) fn placeholder(&self, name: &str, text: &str) -> Suggestion {
        Suggestion::new(text, format!("<{name}> {}", self.description))
    }
}

impl fmt::Debug for NamedArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedArg")
            .field("is_flag", &self.is_flag)
            .field("suggest", &self.suggest.is_some())
            .finish()
    }
}

/// One word-level node of the command tree.
///
/// `C` is the command code type (typically a fieldless enum) and `H` an
/// opaque handler value that is copied into the parse result.
///
/// # Examples
///
/// ```
/// use traffic_shell_core::{CommandFragment, NamedArg, PositionalArg};
///
/// let cloud: CommandFragment<u8> = CommandFragment::new("New public cloud platform")
///     .with_code(1)
///     .with_positional(PositionalArg::required("name", "Name of platform"))
///     .with_named("region", NamedArg::value("Public cloud region"));
///
/// assert!(cloud.is_terminal());
/// assert_eq!(cloud.positional.len(), 1);
/// ```
#[derive(Clone)]
pub struct CommandFragment<C, H = ()> {
    /// Text shown in help and suggestions.
    pub description: String,
    /// Children keyed by lowercase command word.
    pub sub: BTreeMap<String, CommandFragment<C, H>>,
    /// Positional arguments (terminal fragments only).
    pub positional: Vec<PositionalArg>,
    /// Named arguments, keyed without the marker.
    pub named: BTreeMap<String, NamedArg>,
    /// `Some` marks a complete, executable command.
    pub code: Option<C>,
    /// Handler recorded when the parse passes through this fragment.
    pub handler: Option<H>,
}

impl<C, H> CommandFragment<C, H> {
    /// Creates an empty, non-terminal fragment.
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            sub: BTreeMap::new(),
            positional: Vec::new(),
            named: BTreeMap::new(),
            code: None,
            handler: None,
        }
    }

    /// Marks the fragment as a complete command.
    pub fn with_code(mut self, code: C) -> Self {
        self.code = Some(code);
        self
    }

    /// Sets the handler.
    pub fn with_handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Adds a child fragment under `word`.
    pub fn with_sub(mut self, word: &str, fragment: CommandFragment<C, H>) -> Self {
        self.sub.insert(word.to_string(), fragment);
        self
    }

    /// Appends a positional argument.
    pub fn with_positional(mut self, arg: PositionalArg) -> Self {
        self.positional.push(arg);
        self
    }

    /// Declares a named argument.
    pub fn with_named(mut self, name: &str, arg: NamedArg) -> Self {
        self.named.insert(name.to_string(), arg);
        self
    }

    /// Returns `true` when this fragment is a complete command.
    pub fn is_terminal(&self) -> bool {
        self.code.is_some()
    }
}

impl<C: fmt::Debug, H> fmt::Debug for CommandFragment<C, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandFragment")
            .field("description", &self.description)
            .field("sub", &self.sub)
            .field("positional", &self.positional)
            .field("named", &self.named)
            .field("code", &self.code)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// The full command tree.
///
/// Wraps a synthetic, non-terminal root whose children are the top-level
/// command words.
#[derive(Debug, Clone)]
pub struct CommandSpec<C, H = ()> {
    pub(crate) root: CommandFragment<C, H>,
}

impl<C, H> CommandSpec<C, H> {
    /// Creates an empty spec.
    pub fn new() -> Self {
        Self {
            root: CommandFragment::new(""),
        }
    }

    /// Adds a top-level command.
    pub fn with_command(mut self, word: &str, fragment: CommandFragment<C, H>) -> Self {
        self.root.sub.insert(word.to_string(), fragment);
        self
    }

    /// Top-level commands keyed by word.
    pub fn top_level(&self) -> &BTreeMap<String, CommandFragment<C, H>> {
        &self.root.sub
    }

    /// Walks `words` (already lowercase) from the root.
    pub fn find(&self, words: &[&str]) -> Option<&CommandFragment<C, H>> {
        words
            .iter()
            .try_fold(&self.root, |fragment, word| fragment.sub.get(*word))
    }

    /// Lists every terminal command path in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use traffic_shell_core::{CommandFragment, CommandSpec};
    ///
    /// let spec: CommandSpec<u8> = CommandSpec::new()
    ///     .with_command("exit", CommandFragment::new("Exit").with_code(1))
    ///     .with_command(
    ///         "list",
    ///         CommandFragment::new("List things")
    ///             .with_sub("zone", CommandFragment::new("List zones").with_code(2)),
    ///     );
    ///
    /// let paths: Vec<String> = spec.commands().into_iter().map(|(w, _)| w.join(" ")).collect();
    /// assert_eq!(paths, vec!["exit", "list zone"]);
    /// ```
    pub fn commands(&self) -> Vec<(Vec<&str>, &CommandFragment<C, H>)> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        collect_commands(&self.root, &mut path, &mut out);
        out
    }
}

impl<C, H> Default for CommandSpec<C, H> {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_commands<'a, C, H>(
    fragment: &'a CommandFragment<C, H>,
    path: &mut Vec<&'a str>,
    out: &mut Vec<(Vec<&'a str>, &'a CommandFragment<C, H>)>,
) {
    for (word, child) in &fragment.sub {
        path.push(word.as_str());
        if child.is_terminal() {
            out.push((path.clone(), child));
        }
        collect_commands(child, path, out);
        path.pop();
    }
}

/// A fully resolved command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<C, H = ()> {
    /// Code of the terminal fragment.
    pub code: C,
    /// Positional and named argument values; flags map to `""`.
    pub args: BTreeMap<String, String>,
    /// Deepest handler found along the command path.
    pub handler: Option<H>,
}

impl<C, H> ParsedCommand<C, H> {
    /// Returns the value of `name`, if supplied.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }

    /// Returns the value of `name`, or `""` when absent.
    pub fn arg_or_empty(&self, name: &str) -> &str {
        self.arg(name).unwrap_or_default()
    }

    /// Returns `true` if the flag (or any argument) `name` was supplied.
    pub fn has(&self, name: &str) -> bool {
        self.args.contains_key(name)
    }
}
