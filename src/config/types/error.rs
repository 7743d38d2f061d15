//! Errors raised while loading `pagerelay.toml`.

use super::FieldPath;
use owo_colors::{OwoColorize, Stream};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    // No #[from]: the diagnostics already print every problem
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// One invalid value.
#[derive(Debug, Clone)]
struct Problem {
    field: FieldPath,
    message: String,
    hint: Option<String>,
}

/// Every invalid value across all sections, reported together.
///
/// Rendered for stderr:
///
/// ```text
/// config validation failed:
///
/// [serve] serve.path: must not be `/`
///   hint: use a dedicated path such as `/proxy`
/// ```
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    problems: Vec<Problem>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(field, message.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(field, message.into(), Some(hint.into()));
    }

    fn push(&mut self, field: FieldPath, message: String, hint: Option<String>) {
        self.problems.push(Problem {
            field,
            message,
            hint,
        });
    }

    /// `Err(self)` if anything was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let section = format!("[{}]", self.field.section());
        write!(
            f,
            "{} {}: {}",
            section.if_supports_color(Stream::Stderr, |s| s.cyan()),
            self.field,
            self.message
        )?;
        if let Some(hint) = &self.hint {
            let label = "hint:".if_supports_color(Stream::Stderr, |s| s.yellow());
            write!(f, "\n  {label} {hint}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = "config validation failed:";
        writeln!(
            f,
            "{}",
            title.if_supports_color(Stream::Stderr, |s| s.red().bold().to_string())
        )?;
        for problem in &self.problems {
            write!(f, "\n{problem}")?;
        }
        if self.problems.len() > 1 {
            write!(f, "\n\n{} problems", self.problems.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}
