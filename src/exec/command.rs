//! Command launched after the pipe ends

use crate::error::{IdlePipeError, Result};
use std::fmt;
use std::process::{Child, Command};

/// How the command line is turned into a process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandMode {
    /// Split on whitespace into program and arguments
    Direct,
    /// Hand the whole line to `sh -c`
    Shell,
}

/// A command to start once the pipe has finished.
///
/// The command is started and left running; nothing waits for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpCommand {
    program: String,
    args: Vec<String>,
    line: String,
}

impl FollowUpCommand {
    /// Parse a command line
    pub fn parse(line: &str, mode: CommandMode) -> Result<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(IdlePipeError::config("Follow-up command is empty"));
        }

        let (program, args) = match mode {
            CommandMode::Shell => ("sh".to_string(), vec!["-c".to_string(), trimmed.to_string()]),
            CommandMode::Direct => {
                let mut parts = trimmed.split_whitespace().map(str::to_string);
                // Non-empty after trim, so there is at least one part
                let program = parts.next().unwrap_or_default();
                (program, parts.collect())
            }
        };

        Ok(Self {
            program,
            args,
            line: trimmed.to_string(),
        })
    }

    /// Build from CLI values
    pub fn from_cli(cmd: Option<&str>, sh_wrap: bool) -> Result<Option<Self>> {
        let mode = if sh_wrap {
            CommandMode::Shell
        } else {
            CommandMode::Direct
        };

        cmd.map(|line| Self::parse(line, mode)).transpose()
    }

    /// Program to execute
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Start the process without waiting for it
    pub fn spawn(&self) -> Result<Child> {
        tracing::info!("exec: {}", self);

        Command::new(&self.program)
            .args(&self.args)
            .spawn()
            .map_err(|e| IdlePipeError::command(self.line.clone(), e))
    }
}

impl fmt::Display for FollowUpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {:?}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direct() {
        let cmd = FollowUpCommand::parse("  echo hello   world ", CommandMode::Direct).unwrap();
        assert_eq!(cmd.program(), "echo");
        assert_eq!(cmd.args(), ["hello", "world"]);
    }

    #[test]
    fn test_parse_shell() {
        let cmd = FollowUpCommand::parse("echo a | wc -c", CommandMode::Shell).unwrap();
        assert_eq!(cmd.program(), "sh");
        assert_eq!(cmd.args(), ["-c", "echo a | wc -c"]);
        assert_eq!(cmd.to_string(), "sh \"-c\" \"echo a | wc -c\"");
    }

    #[test]
    fn test_parse_empty() {
        let err = FollowUpCommand::parse("   ", CommandMode::Direct).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_from_cli() {
        assert!(FollowUpCommand::from_cli(None, true).unwrap().is_none());

        let cmd = FollowUpCommand::from_cli(Some("true"), false).unwrap().unwrap();
        assert_eq!(cmd.program(), "true");
        assert!(cmd.args().is_empty());
    }

    #[test]
    fn test_spawn_missing_program() {
        let cmd = FollowUpCommand::parse("idlepipe-no-such-program --flag", CommandMode::Direct)
            .unwrap();
        match cmd.spawn() {
            Err(IdlePipeError::Command { command, .. }) => {
                assert_eq!(command, "idlepipe-no-such-program --flag")
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_shell_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("done");

        let line = format!("echo finished > '{}'", marker.display());
        let cmd = FollowUpCommand::parse(&line, CommandMode::Shell).unwrap();

        let status = cmd.spawn().unwrap().wait().unwrap();
        assert!(status.success());
        assert_eq!(std::fs::read_to_string(&marker).unwrap(), "finished\n");
    }
}
