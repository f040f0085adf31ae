//! Child process execution behind an injectable [`CommandRunner`].
//!
//! Agent CLIs stream their output straight into the CI log, so [`CommandRunner::run`]
//! inherits stdout/stderr and only reports whether the child succeeded. Probes
//! that need to inspect output use [`CommandRunner::capture`].

use std::fmt;
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};

/// Program, arguments and extra environment for one child process.
///
/// The child always inherits the parent environment; `envs` are layered on top.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
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

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// `program arg0 arg1 ...`, for error messages.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }
}

// Env values carry tokens; keep them out of `{:?}` output.
impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env_keys: Vec<&str> = self.envs.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("CommandSpec")
            .field("program", &self.program)
            .field("args", &self.args.len())
            .field("env_keys", &env_keys)
            .finish()
    }
}

/// Captured child process output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Abstraction over spawning child processes.
pub trait CommandRunner {
    /// Run to completion with stdout/stderr passed through. Errors unless the
    /// child exits successfully.
    fn run(&self, cmd: &CommandSpec) -> Result<()>;

    /// Run to completion and capture stdout/stderr. A non-zero exit is reported
    /// through [`CommandOutput::success`], not as an error.
    fn capture(&self, cmd: &CommandSpec) -> Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, cmd: &CommandSpec) -> Result<()> {
        (**self).run(cmd)
    }

    fn capture(&self, cmd: &CommandSpec) -> Result<CommandOutput> {
        (**self).capture(cmd)
    }
}

/// Runner that spawns real processes. Blocks until the child exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    #[instrument(skip_all, fields(program = %cmd.program))]
    fn run(&self, cmd: &CommandSpec) -> Result<()> {
        debug!("spawning child process");
        let status = cmd
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| {
                error!(err = %e, "failed to spawn command");
                e
            })
            .with_context(|| format!("spawn {}", cmd.program))?;

        debug!(exit_code = ?status.code(), "command finished");
        check_status(&cmd.program, status)
    }

    #[instrument(skip_all, fields(program = %cmd.program))]
    fn capture(&self, cmd: &CommandSpec) -> Result<CommandOutput> {
        debug!("spawning child process (captured)");
        let output = cmd
            .to_command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("spawn {}", cmd.program))?;

        debug!(exit_code = ?output.status.code(), "command finished");
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn check_status(program: &str, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    warn!(program, exit_code = ?status.code(), "command failed");
    match status.code() {
        Some(code) => Err(anyhow!("{program} exited with status {code}")),
        None => Err(anyhow!("{program} was terminated by a signal")),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn run_reports_non_zero_exit() {
        let cmd = CommandSpec::new("sh").args(["-c", "exit 3"]);
        let err = SystemRunner.run(&cmd).unwrap_err();
        assert!(err.to_string().contains("exited with status 3"));
    }

    #[test]
    fn run_errors_when_program_is_missing() {
        let cmd = CommandSpec::new("definitely-not-a-real-program-xyz");
        let err = SystemRunner.run(&cmd).unwrap_err();
        assert!(err.to_string().contains("spawn definitely-not-a-real-program-xyz"));
    }

    #[test]
    fn capture_collects_stdout_and_layers_env() {
        let cmd = CommandSpec::new("sh")
            .args(["-c", "printf '%s' \"$MISSION_TEST_VALUE\""])
            .env("MISSION_TEST_VALUE", "hello");
        let output = SystemRunner.capture(&cmd).expect("capture");
        assert!(output.success);
        assert_eq!(output.stdout, "hello");
    }

    #[test]
    fn debug_output_hides_env_values() {
        let cmd = CommandSpec::new("gh").env("GITHUB_TOKEN", "secret-value");
        let rendered = format!("{cmd:?}");
        assert!(rendered.contains("GITHUB_TOKEN"));
        assert!(!rendered.contains("secret-value"));
    }
}
