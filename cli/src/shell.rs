//! The command dispatcher and the interactive loop.

use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use traffic_shell_core::Suggestion;

use crate::commands::{SharedCatalog, ShellSpec, build_spec};
use crate::completer::ShellHelper;
use crate::error::{Result, ShellError};
use crate::handlers::{Handler, Outcome, Session};

/// Parses lines against the command tree and runs their handlers.
pub struct Shell {
    spec: Rc<ShellSpec>,
    session: Session,
}

impl Shell {
    pub fn new(catalog: SharedCatalog, table_width: usize) -> Self {
        let spec = Rc::new(build_spec(&catalog));
        let help = help_entries(&spec);
        Self {
            spec,
            session: Session {
                catalog,
                table_width,
                help,
            },
        }
    }

    /// Runs one line.
    ///
    /// # Errors
    ///
    /// Returns the parse error for a malformed line, or whatever the
    /// command's handler reports.
    pub fn execute(&mut self, line: &str, out: &mut dyn Write) -> Result<Outcome> {
        let cmd = self.spec.parse(line)?;
        tracing::debug!(code = ?cmd.code, args = ?cmd.args, "executing");
        match cmd.handler {
            Some(Handler(handler)) => handler(&mut self.session, &cmd, out),
            None => Err(ShellError::Usage(format!(
                "no handler for command {:?}",
                cmd.code
            ))),
        }
    }

    /// Completion candidates for a partial line.
    pub fn complete(&self, line: &str) -> Vec<Suggestion> {
        self.spec.suggest(line)
    }

    /// Reads and runs lines until `exit` or end of input.
    ///
    /// Command errors are printed and the loop continues.
    pub fn run_interactive(
        &mut self,
        prompt: &str,
        history: Option<&Path>,
    ) -> rustyline::Result<()> {
        let mut editor: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
        editor.set_helper(Some(ShellHelper::new(Rc::clone(&self.spec))));
        if let Some(path) = history {
            if let Err(e) = editor.load_history(path) {
                tracing::debug!(path = %path.display(), error = %e, "no history loaded");
            }
        }

        println!("### Traffic shell ### (type 'help' for commands)");
        loop {
            match editor.readline(prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    editor.add_history_entry(line.as_str())?;
                    match self.execute(&line, &mut io::stdout().lock()) {
                        Ok(Outcome::Continue) => {}
                        Ok(Outcome::Exit) => {
                            println!("Bye!");
                            break;
                        }
                        Err(err) => println!("error: {err}"),
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        if let Some(path) = history {
            editor.save_history(path)?;
        }
        Ok(())
    }
}

fn help_entries(spec: &ShellSpec) -> Vec<(String, String)> {
    spec.commands()
        .into_iter()
        .map(|(words, fragment)| {
            let mut usage = words.join(" ");
            for arg in &fragment.positional {
                if arg.optional {
                    usage.push_str(&format!(" [<{}>]", arg.name));
                } else {
                    usage.push_str(&format!(" <{}>", arg.name));
                }
            }
            (usage, fragment.description.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use traffic_shell_core::ParseError;
    use traffic_shell_db::{Catalog, FileStore};

    use super::*;

    fn shell() -> Shell {
        Shell::new(Rc::new(RefCell::new(Catalog::new(FileStore::seeded()))), 80)
    }

    #[test]
    fn test_help_lists_every_command() {
        let mut shell = shell();
        let mut out: Vec<u8> = Vec::new();
        shell.execute("help", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("create platform cloud <name>"));
        assert!(text.contains("delete zone [<name>]"));
        assert!(text.contains("list platform community"));
        assert_eq!(text.lines().count(), shell.spec.commands().len());
    }

    #[test]
    fn test_parse_errors_surface() {
        let mut shell = shell();
        let err = shell.execute("frobnicate", &mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(
            err,
            ShellError::Parse(ParseError::UnrecognizedToken { .. })
        ));
    }

    #[test]
    fn test_exit_outcome() {
        let mut shell = shell();
        assert_eq!(shell.execute("EXIT", &mut Vec::<u8>::new()).unwrap(), Outcome::Exit);
    }

    #[test]
    fn test_complete_matches_spec() {
        let shell = shell();
        let texts: Vec<String> = shell.complete("li").into_iter().map(|s| s.text).collect();
        assert_eq!(texts, vec!["list"]);
    }
}
