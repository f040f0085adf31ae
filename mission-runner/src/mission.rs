//! Mission execution: build the prompt, try the primary model, then the
//! fallback model once.
//!
//! There is no further escalation: at most two agent runs, strictly in
//! sequence, with the same prompt.

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::agents::AgentCli;
use crate::core::prompt::{PromptInputs, PullRequestSettings, build_prompt};
use crate::core::types::{AgentMissionRequest, MissionOutcome};
use crate::io::process::CommandRunner;
use crate::io::workflow;

/// Terminal failure of a mission.
#[derive(Debug, Error)]
pub enum MissionError {
    #[error("agent mission failed and no fallback model is configured: {primary:#}")]
    NoFallback { primary: anyhow::Error },
    #[error(
        "agent mission failed with both primary and fallback models: \
         primary: {primary:#}; fallback ({fallback_model}): {fallback:#}"
    )]
    BothFailed {
        fallback_model: String,
        primary: anyhow::Error,
        fallback: anyhow::Error,
    },
}

/// Run `request` against `agent`.
///
/// Returns which model succeeded. Failures surface as [`MissionError`] inside
/// the returned error.
#[instrument(
    skip_all,
    fields(
        primary = %request.primary_model,
        fallback = ?request.fallback_model,
        dry_run = request.dry_run
    )
)]
pub fn execute_mission<A, R>(
    agent: &A,
    runner: &R,
    request: AgentMissionRequest,
    web_sources: &str,
    pull_request: &PullRequestSettings,
) -> Result<MissionOutcome>
where
    A: AgentCli + ?Sized,
    R: CommandRunner + ?Sized,
{
    let prompt = build_prompt(&PromptInputs {
        mission: &request.mission_text,
        context_files: &request.context_files,
        web_sources: Some(web_sources),
        dry_run: request.dry_run,
        pull_request,
    })
    .context("build mission prompt")?;

    let primary = match agent.run(runner, &prompt, &request.primary_model) {
        Ok(()) => {
            info!("primary model succeeded");
            workflow::notice("Agent mission completed successfully.");
            return Ok(MissionOutcome::Primary);
        }
        Err(err) => err,
    };

    warn!(err = %format!("{primary:#}"), "primary model failed");
    workflow::warning(format!("Primary model failed: {primary:#}"));

    let Some(fallback_model) = request.fallback_model.filter(|m| !m.is_empty()) else {
        return Err(MissionError::NoFallback { primary }.into());
    };

    workflow::notice(format!("Retrying with fallback model: {fallback_model}"));
    match agent.run(runner, &prompt, &fallback_model) {
        Ok(()) => {
            info!(model = %fallback_model, "fallback model succeeded");
            workflow::notice(format!(
                "Agent mission completed with fallback model {fallback_model}."
            ));
            Ok(MissionOutcome::Fallback {
                model: fallback_model,
            })
        }
        Err(fallback) => Err(MissionError::BothFailed {
            fallback_model,
            primary,
            fallback,
        }
        .into()),
    }
}
