//! CI entry point: run one AI agent mission.
//!
//! Resolves the mission, prepares the selected agent CLI, writes the MCP
//! config derived from `.github/sources.yml`, and runs the agent with the
//! primary model (falling back once to `--fallback-model`).

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use mission_runner::agents::{AgentKind, AgentTool};
use mission_runner::app;
use mission_runner::config::{PullRequestOverrides, RunConfig};
use mission_runner::exit_codes;
use mission_runner::io::github_auth::GithubApi;
use mission_runner::io::mission_text::{DEFAULT_TEMPLATES_DIR, UsageError};
use mission_runner::io::process::SystemRunner;
use mission_runner::io::sources::DEFAULT_SOURCES_CONFIG;
use mission_runner::io::workflow;
use mission_runner::logging;

#[derive(Parser)]
#[command(
    name = "mission-runner",
    version,
    about = "Run an AI coding agent mission (Copilot or Gemini) in CI"
)]
struct Cli {
    /// Agent mission prompt. Exactly one of --mission/--template is required.
    #[arg(long)]
    mission: Option<String>,
    /// Mission template name, read from `<templates-dir>/<name>.md`.
    #[arg(long)]
    template: Option<String>,
    /// Directory holding mission templates.
    #[arg(long, default_value = DEFAULT_TEMPLATES_DIR)]
    templates_dir: PathBuf,
    /// Sources config (YAML list of mcp/web sources). Missing file is fine.
    #[arg(long, default_value = DEFAULT_SOURCES_CONFIG)]
    sources_config: PathBuf,
    /// GitHub token used for gh auth and the Copilot CLI.
    #[arg(long)]
    github_token: Option<String>,
    /// Gemini API key (used with `--cli gemini`).
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,
    /// Context files or globs mentioned in the prompt.
    #[arg(long, default_value = ".")]
    context_files: String,
    /// Primary model.
    #[arg(long)]
    model: Option<String>,
    /// Model tried once if the primary model fails.
    #[arg(long)]
    fallback_model: Option<String>,
    /// Tell the agent not to open a pull request.
    #[arg(long)]
    dry_run: bool,
    /// Skip CLI/extension installation and gh auth.
    #[arg(long)]
    skip_setup: bool,
    /// Agent CLI to drive.
    #[arg(long, value_enum, ignore_case = true, default_value_t = AgentKind::Copilot)]
    cli: AgentKind,
    /// File receiving exported variables; prints them when unset.
    #[arg(long, env = "GITHUB_ENV")]
    github_env: Option<PathBuf>,
    /// Home directory for generated tool configs.
    #[arg(long, env = "HOME")]
    home: Option<PathBuf>,
    #[command(flatten)]
    pull_request: PullRequestOverrides,
}

impl Cli {
    fn into_config(self, now: DateTime<Utc>) -> RunConfig {
        RunConfig {
            mission: self.mission,
            template: self.template,
            templates_dir: self.templates_dir,
            sources_config: Some(self.sources_config),
            github_token: self.github_token.unwrap_or_default(),
            gemini_api_key: self.gemini_api_key.filter(|k| !k.is_empty()),
            context_files: self.context_files,
            model: self.model.unwrap_or_default(),
            fallback_model: self.fallback_model,
            dry_run: self.dry_run,
            skip_setup: self.skip_setup,
            agent: self.cli,
            pull_request: self.pull_request.resolve(now),
            github_env: self.github_env,
            home: self.home,
        }
    }
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        workflow::error(format!("{err:#}"));
        std::process::exit(exit_code_for(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config(Utc::now());
    let mut agent = AgentTool::new(config.agent);
    let identity = GithubApi::new()?;
    app::run(&config, &mut agent, &SystemRunner, &identity)?;
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<UsageError>().is_some() {
        exit_codes::INVALID
    } else {
        exit_codes::FAILED
    }
}
