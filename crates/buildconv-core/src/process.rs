//! External process execution for environment probes.

use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

/// Failure of an external command.
///
/// This is the only error the convention engines ever see from a probe; they
/// catch it at each call site and degrade to "no data available".
#[derive(Debug, Error)]
pub enum RunFailedError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}")]
    NonZeroExit { command: String, status: String },
}

/// Runs an external command and captures its standard output.
///
/// Implementations are synchronous and blocking; timeout and cancellation,
/// if any, are the implementation's responsibility. The engines never retry
/// a failed run.
pub trait ProcessRunner {
    /// Run `command` (executable followed by its arguments) and return the
    /// captured standard output.
    fn run(&self, command: &[&str]) -> Result<String, RunFailedError>;
}

/// [`ProcessRunner`] backed by [`std::process::Command`].
///
/// An optional working directory lets collaborators probe git from the
/// build's root rather than from wherever the host process happens to run.
#[derive(Debug, Clone, Default)]
pub struct SystemProcessRunner {
    working_dir: Option<PathBuf>,
}

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command from the given directory.
    pub fn in_dir(working_dir: impl Into<PathBuf>) -> Self {
        SystemProcessRunner {
            working_dir: Some(working_dir.into()),
        }
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, command: &[&str]) -> Result<String, RunFailedError> {
        let display = command.join(" ");
        let (executable, args) = command.split_first().ok_or_else(|| RunFailedError::Spawn {
            command: display.clone(),
            source: std::io::Error::other("empty command line"),
        })?;

        let mut cmd = Command::new(executable);
        cmd.args(args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| RunFailedError::Spawn {
            command: display.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(RunFailedError::NonZeroExit {
                command: display,
                status: output.status.to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
