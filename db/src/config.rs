//! Shell configuration.
//!
//! Defines the YAML-serializable settings of the interactive shell. Every
//! field has a default, so an empty file (or no file at all) is valid.
//!
//! # Example YAML
//!
//! ```yaml
//! prompt: "traffic> "
//! state_file: /var/lib/traffic-shell/state.json
//! history_file: ~/.traffic_shell_history
//! log_level: info
//! table_width: 120
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Fallback table width when neither the config nor `COLUMNS` give one.
pub const DEFAULT_TABLE_WIDTH: usize = 80;

/// Interactive shell settings.
///
/// # Examples
///
/// ```
/// use traffic_shell_db::ShellConfig;
///
/// let config: ShellConfig = serde_yaml::from_str("prompt: \"$ \"").unwrap();
/// assert_eq!(config.prompt, "$ ");
/// assert_eq!(config.log_level, "warn");
/// assert_eq!(config.state_file.to_str(), Some("traffic-shell.json"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt printed before each line.
    pub prompt: String,
    /// JSON document holding resources.
    pub state_file: PathBuf,
    /// Line-editor history; none keeps history in memory only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Width tables are truncated to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_width: Option<usize>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            state_file: PathBuf::from("traffic-shell.json"),
            history_file: None,
            log_level: "warn".to_string(),
            table_width: None,
        }
    }
}

impl ShellConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DbError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::DbError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DbError::IoError) if the file cannot be
    /// written, or [`YamlError`](crate::DbError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Resolves the table width: config, then `columns`, then 80.
    ///
    /// `columns` is normally the `COLUMNS` environment variable.
    ///
    /// # Examples
    ///
    /// ```
    /// use traffic_shell_db::ShellConfig;
    ///
    /// let mut config = ShellConfig::default();
    /// assert_eq!(config.resolve_table_width(Some("132")), 132);
    /// assert_eq!(config.resolve_table_width(Some("wide")), 80);
    /// config.table_width = Some(40);
    /// assert_eq!(config.resolve_table_width(Some("132")), 40);
    /// ```
    pub fn resolve_table_width(&self, columns: Option<&str>) -> usize {
        self.table_width
            .or_else(|| columns.and_then(|c| c.trim().parse().ok()))
            .filter(|&w| w > 0)
            .unwrap_or(DEFAULT_TABLE_WIDTH)
    }
}
