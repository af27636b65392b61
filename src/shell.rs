//! Shell command execution
//!
//! This module is the ONLY place softshelf touches the host shell. Everything
//! above it hands over an opaque command string and gets back exit status and
//! captured output; nothing in the core ever inspects command content.
//!
//! The `CommandRunner` trait is the seam between the controller and the real
//! shell: production code uses `ShellRunner`, tests inject scripted stubs.

use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use tracing::debug;

/// Captured result of one shell command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output from the command.
    pub stdout: String,
    /// Standard error from the command.
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the command exited successfully (exit code 0).
    pub success: bool,
}

impl CommandOutput {
    /// True if the command succeeded AND produced non-whitespace stdout.
    ///
    /// This is the probe criterion: package-manager search commands report
    /// an installed package by printing a match, so an empty result means
    /// "not installed" even on exit 0.
    pub fn has_output(&self) -> bool {
        self.success && !self.stdout.trim().is_empty()
    }
}

/// Executes opaque command strings through the host shell.
///
/// `run` returns `Err` only when the command could not be started at all;
/// a command that starts and exits non-zero is an `Ok` with `success: false`.
/// Callers decide what either case means for them.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &str) -> Result<CommandOutput>;
}

/// Production runner: executes commands via `sh -c`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        debug!(command, "running shell command");

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("Failed to spawn command: {}", command))?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
        };

        debug!(
            command,
            exit_code = ?result.exit_code,
            success = result.success,
            "shell command finished"
        );

        Ok(result)
    }
}
