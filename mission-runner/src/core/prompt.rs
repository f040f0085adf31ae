//! Final prompt text handed to the agent CLI.

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;

const PULL_REQUEST_TEMPLATE: &str = include_str!("../prompts/pull_request.md");

/// Appended instead of the pull request block when running dry.
pub const DRY_RUN_NOTICE: &str = "NOTE: dry_run is set to TRUE. Do NOT create a Pull Request. \
Just verify the changes and report what you would have done.";

/// Heading that opens the mandatory pull request block.
pub const PULL_REQUEST_HEADING: &str = "### MANDATORY: Pull Request Creation";

/// Pull request parameters the agent must use. Resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestSettings {
    pub repository: String,
    pub base: String,
    pub branch: String,
    pub title: String,
    pub body: String,
    pub labels: String,
}

/// Inputs for [`build_prompt`].
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    pub mission: &'a str,
    pub context_files: &'a str,
    /// Web sources sentence; empty or `None` leaves it out.
    pub web_sources: Option<&'a str>,
    pub dry_run: bool,
    pub pull_request: &'a PullRequestSettings,
}

/// Build `"<mission> (context files: <ctx>)[. <web>]"` followed by either the
/// pull request contract or the dry-run notice.
pub fn build_prompt(inputs: &PromptInputs<'_>) -> Result<String> {
    let mut prompt = format!(
        "{} (context files: {})",
        inputs.mission, inputs.context_files
    );
    if let Some(web) = inputs.web_sources.filter(|w| !w.is_empty()) {
        prompt.push_str(". ");
        prompt.push_str(web);
    }

    prompt.push_str("\n\n");
    if inputs.dry_run {
        prompt.push_str(DRY_RUN_NOTICE);
    } else {
        prompt.push_str(&render_pull_request(inputs.pull_request)?);
    }
    prompt.push('\n');
    Ok(prompt)
}

fn render_pull_request(settings: &PullRequestSettings) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("pull_request", PULL_REQUEST_TEMPLATE)
        .context("load pull request template")?;
    let rendered = env
        .get_template("pull_request")?
        .render(context! { pr => settings })
        .context("render pull request template")?;
    Ok(rendered)
}
