//! Orchestration for one mission run.
//!
//! Order matters: configuration errors abort before anything external runs,
//! setup problems only warn, auth problems are fatal, and source decode errors
//! degrade to an empty source set.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::agents::{AgentCli, AgentKind};
use crate::config::RunConfig;
use crate::core::sources::ProcessedSources;
use crate::core::types::{AgentMissionRequest, MissionOutcome};
use crate::io::copilot_config::write_copilot_config;
use crate::io::github_auth::{IdentityLookup, configure_gh_auth};
use crate::io::github_env::EnvSink;
use crate::io::mission_text::resolve_mission;
use crate::io::process::{CommandRunner, CommandSpec};
use crate::io::sources::load_processed_sources;
use crate::io::workflow;
use crate::mission::execute_mission;

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: MissionOutcome,
    pub sources: ProcessedSources,
    /// Written Copilot MCP config, when the Copilot CLI was selected.
    pub copilot_config: Option<PathBuf>,
}

/// Execute a full run with the given collaborators.
#[instrument(
    skip_all,
    fields(
        agent = config.agent.as_str(),
        skip_setup = config.skip_setup,
        dry_run = config.dry_run
    )
)]
pub fn run<A, R, L>(
    config: &RunConfig,
    agent: &mut A,
    runner: &R,
    identity: &L,
) -> Result<RunReport>
where
    A: AgentCli,
    R: CommandRunner + ?Sized,
    L: IdentityLookup + ?Sized,
{
    let mission_text = resolve_mission(
        config.mission.as_deref(),
        config.template.as_deref(),
        &config.templates_dir,
    )?;
    debug!(mission_bytes = mission_text.len(), "resolved mission");

    let request = AgentMissionRequest {
        mission_text: mission_text.clone(),
        context_files: config.context_files.clone(),
        primary_model: config.model.clone(),
        fallback_model: config.fallback(),
        dry_run: config.dry_run,
        auth_token: config.agent_token(),
    };

    if config.skip_setup {
        if let Err(err) = agent.authenticate(&request.auth_token) {
            warn!(err = %format!("{err:#}"), "agent authentication failed with setup skipped");
        }
    } else {
        setup(config, agent, runner, identity, &request.auth_token)?;
    }

    let sources = match load_processed_sources(config.sources_config.as_deref()) {
        Ok(sources) => sources,
        Err(err) => {
            workflow::error(format!("Error parsing sources: {err:#}"));
            ProcessedSources::default()
        }
    };

    let copilot_config = if config.agent == AgentKind::Copilot {
        let home = require_home(config)?;
        let (path, payload) = write_copilot_config(home, &sources.mcp_servers)
            .context("write copilot config")?;
        workflow::notice(format!("Copilot config written to {}", path.display()));
        workflow::notice(payload.trim_end());
        Some(path)
    } else {
        None
    };

    let sink = EnvSink::from_github_env(config.github_env.clone());
    for (name, value) in [
        ("RESOLVED_MISSION", mission_text.as_str()),
        ("EXTRA_WEB_SOURCES", sources.web_sources.as_str()),
    ] {
        if let Err(err) = sink.export(name, value) {
            workflow::error(format!("Failed to export {name}: {err:#}"));
        }
    }

    let gh_present = runner
        .capture(&CommandSpec::new("gh").arg("--version"))
        .map(|out| out.success)
        .unwrap_or(false);
    if !gh_present {
        workflow::warning("gh CLI not found in path");
    }

    let outcome = execute_mission(
        &*agent,
        runner,
        request,
        &sources.web_sources,
        &config.pull_request,
    )
    .context("mission execution failed")?;

    info!(outcome = ?outcome, "run finished");
    Ok(RunReport {
        outcome,
        sources,
        copilot_config,
    })
}

/// Install (best effort), configure `gh` auth, and bind the agent credential.
fn setup<A, R, L>(
    config: &RunConfig,
    agent: &mut A,
    runner: &R,
    identity: &L,
    token: &str,
) -> Result<()>
where
    A: AgentCli,
    R: CommandRunner + ?Sized,
    L: IdentityLookup + ?Sized,
{
    if let Err(err) = agent.install(runner) {
        workflow::warning(format!("Setup failed ({} CLI): {err:#}", agent.name()));
    }

    match config.agent {
        AgentKind::Copilot => {
            configure_gh_auth(identity, &config.github_token, require_home(config)?)
                .context("gh auth failed")?;
        }
        AgentKind::Gemini => {
            if token.is_empty() {
                return Err(anyhow!("GEMINI_API_KEY is missing or empty in environment"));
            }
            workflow::debug("GEMINI_API_KEY found in environment.");
            // PR creation still goes through gh.
            if !config.github_token.is_empty() {
                configure_gh_auth(identity, &config.github_token, require_home(config)?)
                    .context("gh auth failed")?;
            }
        }
    }

    agent.authenticate(token).context("ai cli auth failed")
}

fn require_home(config: &RunConfig) -> Result<&Path> {
    config
        .home
        .as_deref()
        .filter(|home| !home.as_os_str().is_empty())
        .ok_or_else(|| anyhow!("HOME is not set"))
}
