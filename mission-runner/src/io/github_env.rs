//! Exports values to later workflow steps through the `GITHUB_ENV` file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

/// Preferred heredoc delimiter for multi-line values.
const DELIMITER: &str = "EOF";

/// Where exported variables go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvSink {
    /// Append to the file named by `GITHUB_ENV`.
    File(PathBuf),
    /// Not running under Actions: print `EXPORT NAME=value` lines.
    Stdout,
}

impl EnvSink {
    pub fn from_github_env(path: Option<PathBuf>) -> Self {
        match path.filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => Self::File(path),
            None => Self::Stdout,
        }
    }

    /// Export `name=value`. Empty values are skipped.
    #[instrument(skip(self, value))]
    pub fn export(&self, name: &str, value: &str) -> Result<()> {
        if value.is_empty() {
            debug!("skipping empty value");
            return Ok(());
        }
        match self {
            Self::File(path) => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("open {}", path.display()))?;
                file.write_all(format_entry(name, value).as_bytes())
                    .with_context(|| format!("append {name} to {}", path.display()))?;
            }
            Self::Stdout => println!("EXPORT {name}={value}"),
        }
        Ok(())
    }
}

/// `NAME=value\n`, or a `NAME<<EOF` heredoc block when `value` spans lines.
pub fn format_entry(name: &str, value: &str) -> String {
    if value.contains('\n') {
        let delimiter = heredoc_delimiter(value);
        format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
    } else {
        format!("{name}={value}\n")
    }
}

/// `EOF`, or `EOF_<n>` when a line of `value` would close the block early.
fn heredoc_delimiter(value: &str) -> String {
    let mut delimiter = DELIMITER.to_string();
    let mut suffix = 0;
    while value.lines().any(|line| line == delimiter) {
        suffix += 1;
        delimiter = format!("{DELIMITER}_{suffix}");
    }
    delimiter
}
