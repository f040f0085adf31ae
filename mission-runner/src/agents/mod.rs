//! Agent CLI strategies.
//!
//! The [`AgentCli`] trait decouples the mission policy from the concrete
//! tool. [`AgentTool`] is the closed set the binary can drive; it is chosen
//! once from `--cli` and dispatched by variant. Tests use scripted agents
//! that record calls without spawning processes.

use anyhow::Result;
use clap::ValueEnum;

use crate::io::process::CommandRunner;

pub mod copilot;
pub mod gemini;

pub use copilot::CopilotCli;
pub use gemini::GeminiCli;

/// Capabilities the mission runner needs from an agent tool.
pub trait AgentCli {
    /// Short tool name for log lines.
    fn name(&self) -> &'static str;

    /// Best-effort, idempotent installation of binaries and extensions.
    fn install<R: CommandRunner + ?Sized>(&self, runner: &R) -> Result<()>;

    /// Bind the credential used by later [`AgentCli::run`] calls.
    fn authenticate(&mut self, token: &str) -> Result<()>;

    /// Run one prompt against `model`, streaming the tool's output.
    /// An empty `model` selects the tool's default.
    fn run<R: CommandRunner + ?Sized>(&self, runner: &R, prompt: &str, model: &str)
    -> Result<()>;
}

/// `--cli` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AgentKind {
    Copilot,
    Gemini,
}

impl AgentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Copilot => "copilot",
            Self::Gemini => "gemini",
        }
    }
}

/// The agent tool selected for this run.
#[derive(Debug, Clone)]
pub enum AgentTool {
    Copilot(CopilotCli),
    Gemini(GeminiCli),
}

impl AgentTool {
    pub fn new(kind: AgentKind) -> Self {
        match kind {
            AgentKind::Copilot => Self::Copilot(CopilotCli::default()),
            AgentKind::Gemini => Self::Gemini(GeminiCli::default()),
        }
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            Self::Copilot(_) => AgentKind::Copilot,
            Self::Gemini(_) => AgentKind::Gemini,
        }
    }
}

impl AgentCli for AgentTool {
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn install<R: CommandRunner + ?Sized>(&self, runner: &R) -> Result<()> {
        match self {
            Self::Copilot(cli) => cli.install(runner),
            Self::Gemini(cli) => cli.install(runner),
        }
    }

    fn authenticate(&mut self, token: &str) -> Result<()> {
        match self {
            Self::Copilot(cli) => cli.authenticate(token),
            Self::Gemini(cli) => cli.authenticate(token),
        }
    }

    fn run<R: CommandRunner + ?Sized>(
        &self,
        runner: &R,
        prompt: &str,
        model: &str,
    ) -> Result<()> {
        match self {
            Self::Copilot(cli) => cli.run(runner, prompt, model),
            Self::Gemini(cli) => cli.run(runner, prompt, model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_matches_selected_kind() {
        assert_eq!(AgentTool::new(AgentKind::Copilot).name(), "copilot");
        assert_eq!(AgentTool::new(AgentKind::Gemini).name(), "gemini");
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!(
            AgentKind::from_str("Gemini", true).expect("parse"),
            AgentKind::Gemini
        );
        assert!(AgentKind::from_str("claude", true).is_err());
    }
}
