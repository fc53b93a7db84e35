mod commands;
mod completer;
mod error;
mod handlers;
mod shell;
mod table;

use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use traffic_shell_core::Suggestion;
use traffic_shell_db::{Catalog, FileStore, ShellConfig};

use crate::handlers::Outcome;
use crate::shell::Shell;

/// Output format for `complete`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CompleteFormat {
    Json,
    Yaml,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "traffic-shell")]
#[command(about = "Interactive shell for traffic-steering resources and DNS zones")]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// State file, overriding the configured one.
    #[arg(long, global = true)]
    state: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the interactive shell (default).
    Shell,
    /// Run a single command line.
    Exec(ExecArgs),
    /// Print completion candidates for a partial line.
    Complete(CompleteArgs),
    /// Write a state file seeded with community platforms.
    Init(InitArgs),
}

#[derive(Debug, Args)]
struct ExecArgs {
    /// Command words, e.g. `list zone -filter example`.
    #[arg(
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    words: Vec<String>,
}

#[derive(Debug, Args)]
struct CompleteArgs {
    /// Partial line, quoted as one argument. A trailing space asks for the next word.
    #[arg(allow_hyphen_values = true)]
    line: String,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: CompleteFormat,
}

#[derive(Debug, Args)]
struct InitArgs {
    /// Overwrite an existing state file.
    #[arg(long)]
    force: bool,
}

fn main() {
    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|mut config| {
        init_tracing(cli.verbose, &config.log_level);
        if let Some(state) = cli.state {
            config.state_file = state;
        }
        match cli.command.unwrap_or(Command::Shell) {
            Command::Shell => run_shell(&config),
            Command::Exec(args) => run_exec(&config, args),
            Command::Complete(args) => run_complete(&config, args),
            Command::Init(args) => run_init(&config, args),
        }
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<ShellConfig, String> {
    match path {
        Some(path) => ShellConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(ShellConfig::default()),
    }
}

fn init_tracing(verbose: bool, default_level: &str) {
    let fallback = if verbose { "debug" } else { default_level };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}

fn open_shell(config: &ShellConfig) -> Result<Shell, String> {
    let store = FileStore::open(&config.state_file).map_err(|err| {
        format!(
            "Failed to open state file '{}': {err}",
            config.state_file.display()
        )
    })?;
    let columns = std::env::var("COLUMNS").ok();
    let width = config.resolve_table_width(columns.as_deref());
    Ok(Shell::new(Rc::new(RefCell::new(Catalog::new(store))), width))
}

fn run_shell(config: &ShellConfig) -> Result<(), String> {
    let mut shell = open_shell(config)?;
    shell
        .run_interactive(&config.prompt, config.history_file.as_deref())
        .map_err(|err| format!("Line editor failed: {err}"))
}

fn run_exec(config: &ShellConfig, args: ExecArgs) -> Result<(), String> {
    let mut shell = open_shell(config)?;
    let line = join_words(&args.words);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match shell.execute(&line, &mut out).map_err(|err| err.to_string())? {
        Outcome::Continue => {}
        Outcome::Exit => writeln!(out, "Bye!").map_err(|err| err.to_string())?,
    }
    Ok(())
}

fn run_complete(config: &ShellConfig, args: CompleteArgs) -> Result<(), String> {
    let shell = open_shell(config)?;
    let suggestions = shell.complete(&args.line);
    let raw = format_suggestions(&suggestions, args.format)?;
    print!("{raw}");
    Ok(())
}

fn run_init(config: &ShellConfig, args: InitArgs) -> Result<(), String> {
    let path = &config.state_file;
    if path.exists() && !args.force {
        return Err(format!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        ));
    }
    FileStore::seeded()
        .save_to(path)
        .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
    println!("Wrote seeded state to '{}'.", path.display());
    Ok(())
}

fn format_suggestions(
    suggestions: &[Suggestion],
    format: CompleteFormat,
) -> Result<String, String> {
    match format {
        CompleteFormat::Json => serde_json::to_string_pretty(suggestions)
            .map(|raw| raw + "\n")
            .map_err(|err| format!("Failed to serialize suggestions: {err}")),
        CompleteFormat::Yaml => serde_yaml::to_string(suggestions)
            .map_err(|err| format!("Failed to serialize suggestions: {err}")),
        CompleteFormat::Text => Ok(suggestions
            .iter()
            .map(|s| format!("{}\t{}\n", s.text, s.description))
            .collect()),
    }
}

/// Rebuilds a shell line from argv words, re-quoting words with spaces.
fn join_words(words: &[String]) -> String {
    words
        .iter()
        .map(|word| {
            if word.is_empty() || word.contains(' ') {
                format!("\"{word}\"")
            } else {
                word.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_words_requotes() {
        let words = vec![
            "show".to_string(),
            "platform".to_string(),
            "Amazon CloudFront".to_string(),
        ];
        assert_eq!(join_words(&words), r#"show platform "Amazon CloudFront""#);
    }

    #[test]
    fn test_text_format() {
        let raw = format_suggestions(
            &[Suggestion::new("-filter", "Regex filter")],
            CompleteFormat::Text,
        )
        .unwrap();
        assert_eq!(raw, "-filter\tRegex filter\n");
    }

    #[test]
    fn test_cli_parses_exec_with_named_args() {
        let cli = Cli::try_parse_from([
            "traffic-shell",
            "--state",
            "s.json",
            "exec",
            "list",
            "zone",
            "-filter",
            "x",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Exec(args)) => {
                assert_eq!(args.words, vec!["list", "zone", "-filter", "x"])
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
