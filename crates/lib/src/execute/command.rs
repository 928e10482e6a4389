//! Command line description shared by execution, planning and tests.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A fully resolved external command.
///
/// Arguments are kept verbatim and in order; nothing is ever deduplicated or
/// reordered between the build file and the spawned process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandLine {
  pub program: String,
  pub args: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cwd: Option<PathBuf>,
}

impl CommandLine {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
    }
  }

  /// Build a command from an argv-style list. Returns `None` for an empty list.
  pub fn from_argv(argv: &[String]) -> Option<Self> {
    let (program, args) = argv.split_first()?;
    Some(Self::new(program.clone()).args(args.iter().cloned()))
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  pub fn working_dir(&self) -> Option<&Path> {
    self.cwd.as_deref()
  }

  /// Prefix the command with an elevation tool such as `sudo`.
  ///
  /// With `None` the command is returned unchanged.
  pub fn elevated(self, via: Option<&str>) -> Self {
    match via {
      Some(via) => {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program);
        args.extend(self.args);
        Self {
          program: via.to_string(),
          args,
          cwd: self.cwd,
        }
      }
      None => self,
    }
  }
}

impl fmt::Display for CommandLine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", quote(&self.program))?;
    for arg in &self.args {
      write!(f, " {}", quote(arg))?;
    }
    Ok(())
  }
}

fn quote(word: &str) -> String {
  if word.is_empty() || word.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
    format!("'{}'", word.replace('\'', r"'\''"))
  } else {
    word.to_string()
  }
}
