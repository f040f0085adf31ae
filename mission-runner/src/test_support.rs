//! Test-only fakes for the process, agent and identity seams.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};

use anyhow::{Result, anyhow};

use crate::agents::AgentCli;
use crate::io::github_auth::IdentityLookup;
use crate::io::process::{CommandOutput, CommandRunner, CommandSpec};

/// Records every command and answers from a script keyed by
/// [`CommandSpec::display_line`]. Unscripted commands succeed with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    run_failures: HashSet<String>,
    run_failure_prefixes: Vec<String>,
    capture_failures: HashSet<String>,
    capture_stdout: HashMap<String, String>,
    runs: RefCell<Vec<CommandSpec>>,
    captures: RefCell<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// `run` of this command line exits non-zero.
    pub fn with_run_failure(mut self, line: &str) -> Self {
        self.run_failures.insert(line.to_string());
        self
    }

    /// `run` of any command line starting with `prefix` exits non-zero.
    pub fn with_run_failure_prefix(mut self, prefix: &str) -> Self {
        self.run_failure_prefixes.push(prefix.to_string());
        self
    }

    /// `capture` of this command line fails to spawn.
    pub fn with_capture_failure(mut self, line: &str) -> Self {
        self.capture_failures.insert(line.to_string());
        self
    }

    /// `capture` of this command line succeeds with `stdout`.
    pub fn with_capture_stdout(mut self, line: &str, stdout: &str) -> Self {
        self.capture_stdout
            .insert(line.to_string(), stdout.to_string());
        self
    }

    pub fn runs(&self) -> Vec<CommandSpec> {
        self.runs.borrow().clone()
    }

    pub fn run_lines(&self) -> Vec<String> {
        self.runs.borrow().iter().map(CommandSpec::display_line).collect()
    }

    pub fn capture_lines(&self) -> Vec<String> {
        self.captures
            .borrow()
            .iter()
            .map(CommandSpec::display_line)
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, cmd: &CommandSpec) -> Result<()> {
        self.runs.borrow_mut().push(cmd.clone());
        let line = cmd.display_line();
        if self.run_failures.contains(&line)
            || self.run_failure_prefixes.iter().any(|p| line.starts_with(p))
        {
            return Err(anyhow!("{} exited with status 1", cmd.program));
        }
        Ok(())
    }

    fn capture(&self, cmd: &CommandSpec) -> Result<CommandOutput> {
        self.captures.borrow_mut().push(cmd.clone());
        let line = cmd.display_line();
        if self.capture_failures.contains(&line) {
            return Err(anyhow!("spawn {}", cmd.program));
        }
        Ok(CommandOutput {
            success: true,
            code: Some(0),
            stdout: self.capture_stdout.get(&line).cloned().unwrap_or_default(),
            stderr: String::new(),
        })
    }
}

/// One recorded [`AgentCli::run`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCall {
    pub prompt: String,
    pub model: String,
}

/// Agent whose `run` results are queued up front. Once the queue is empty,
/// runs succeed.
#[derive(Debug, Default)]
pub struct ScriptedAgent {
    results: RefCell<VecDeque<Result<(), String>>>,
    install_error: Option<String>,
    installs: Cell<usize>,
    token: Option<String>,
    calls: RefCell<Vec<AgentCall>>,
}

impl ScriptedAgent {
    pub fn new(results: Vec<Result<(), String>>) -> Self {
        Self {
            results: RefCell::new(results.into()),
            ..Self::default()
        }
    }

    pub fn with_install_error(mut self, message: &str) -> Self {
        self.install_error = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<AgentCall> {
        self.calls.borrow().clone()
    }

    pub fn installs(&self) -> usize {
        self.installs.get()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl AgentCli for ScriptedAgent {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn install<R: CommandRunner + ?Sized>(&self, _runner: &R) -> Result<()> {
        self.installs.set(self.installs.get() + 1);
        match &self.install_error {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(()),
        }
    }

    fn authenticate(&mut self, token: &str) -> Result<()> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn run<R: CommandRunner + ?Sized>(
        &self,
        _runner: &R,
        prompt: &str,
        model: &str,
    ) -> Result<()> {
        self.calls.borrow_mut().push(AgentCall {
            prompt: prompt.to_string(),
            model: model.to_string(),
        });
        match self.results.borrow_mut().pop_front() {
            Some(Err(message)) => Err(anyhow!("{message}")),
            Some(Ok(())) | None => Ok(()),
        }
    }
}

/// Identity lookup with a fixed answer.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    result: Result<String, String>,
}

impl StaticIdentity {
    pub fn ok(login: &str) -> Self {
        Self {
            result: Ok(login.to_string()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
        }
    }
}

impl IdentityLookup for StaticIdentity {
    fn login(&self, _token: &str) -> Result<String> {
        self.result.clone().map_err(|message| anyhow!("{message}"))
    }
}
