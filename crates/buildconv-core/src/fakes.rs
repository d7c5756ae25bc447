//! Process-runner fakes (testing only).
//!
//! These live in src rather than under tests so that integration tests and
//! downstream crates can import them alongside the recording capabilities.

use std::collections::HashMap;

use crate::process::{ProcessRunner, RunFailedError};

/// Replays canned standard output for exact command lines and fails for
/// everything else, like a host where only the scripted tools exist.
#[derive(Debug, Default)]
pub struct ScriptedProcessRunner {
    outputs: HashMap<String, String>,
}

impl ScriptedProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output of an exact command line.
    pub fn on(mut self, command: &[&str], output: &str) -> Self {
        self.outputs.insert(command.join(" "), output.to_string());
        self
    }
}

impl ProcessRunner for ScriptedProcessRunner {
    fn run(&self, command: &[&str]) -> Result<String, RunFailedError> {
        let key = command.join(" ");
        match self.outputs.get(&key) {
            Some(output) => Ok(output.clone()),
            None => Err(RunFailedError::Spawn {
                command: key,
                source: std::io::Error::other("command not scripted"),
            }),
        }
    }
}

/// Fails every run, like a host with no external tools at all.
#[derive(Debug, Default)]
pub struct FailingProcessRunner;

impl ProcessRunner for FailingProcessRunner {
    fn run(&self, command: &[&str]) -> Result<String, RunFailedError> {
        Err(RunFailedError::Spawn {
            command: command.join(" "),
            source: std::io::Error::other("no tools available"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_output_is_replayed() {
        let runner = ScriptedProcessRunner::new().on(&["git", "status"], " M build.rs\n");
        assert_eq!(runner.run(&["git", "status"]).unwrap(), " M build.rs\n");
    }

    #[test]
    fn unscripted_command_fails() {
        let runner = ScriptedProcessRunner::new();
        assert!(runner.run(&["git", "status"]).is_err());
    }

    #[test]
    fn failing_runner_always_fails() {
        assert!(FailingProcessRunner.run(&["docker", "--version"]).is_err());
    }
}
