//! Run configuration assembled once at startup.
//!
//! Every environment-backed setting is read by clap when the CLI is parsed;
//! nothing below `main` looks at the process environment.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;

use crate::agents::AgentKind;
use crate::core::prompt::PullRequestSettings;

pub const DEFAULT_PR_BASE: &str = "main";
pub const DEFAULT_PR_BRANCH_PREFIX: &str = "agent/audit-";
pub const DEFAULT_PR_TITLE: &str = "Use STRICT Conventional Commits format \
(e.g., refactor(skills): [AI-GENERATED] audit and clarify instructions).";
pub const DEFAULT_PR_BODY: &str = "You MUST provide a comprehensive, elite-quality description structured as follows:
### 🔎 Audit Overview
Provide a high-level technical summary of what was audited and the general state of the skills.

### 🛠 Detailed Changes
Provide a per-skill breakdown of specific technical improvements (e.g., Skill X: Removed 40% verbosity, updated paths to match current source tree).

### ⚠️ Manual Review Required
List any specific files where you added <!-- ISSUE --> comments because they require human intervention.";
pub const DEFAULT_PR_LABELS: &str = "automated-pr";

/// Pull request overrides. Unset or empty values fall back to the defaults above.
#[derive(Debug, Clone, Default, Args)]
pub struct PullRequestOverrides {
    /// Repository the PR targets (owner/name).
    #[arg(long = "pr-repository", env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,
    /// Base branch of the PR.
    #[arg(long = "pr-base", env = "PR_BASE")]
    pub base: Option<String>,
    /// Head branch name; defaults to `agent/audit-<unix time>`.
    #[arg(long = "pr-branch", env = "PR_BRANCH")]
    pub branch: Option<String>,
    /// PR title instruction.
    #[arg(long = "pr-title", env = "PR_TITLE")]
    pub title: Option<String>,
    /// PR body instruction.
    #[arg(long = "pr-body", env = "PR_BODY")]
    pub body: Option<String>,
    /// Comma-separated labels.
    #[arg(long = "pr-labels", env = "PR_LABELS")]
    pub labels: Option<String>,
}

impl PullRequestOverrides {
    /// Apply defaults. `now` seeds the default branch name.
    pub fn resolve(&self, now: DateTime<Utc>) -> PullRequestSettings {
        PullRequestSettings {
            repository: or_default(&self.repository, String::new),
            base: or_default(&self.base, || DEFAULT_PR_BASE.to_string()),
            branch: or_default(&self.branch, || {
                format!("{DEFAULT_PR_BRANCH_PREFIX}{}", now.timestamp())
            }),
            title: or_default(&self.title, || DEFAULT_PR_TITLE.to_string()),
            body: or_default(&self.body, || DEFAULT_PR_BODY.to_string()),
            labels: or_default(&self.labels, || DEFAULT_PR_LABELS.to_string()),
        }
    }
}

fn or_default(value: &Option<String>, default: impl FnOnce() -> String) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(default)
}

/// Everything a run needs, resolved from flags and environment.
#[derive(Clone)]
pub struct RunConfig {
    pub mission: Option<String>,
    pub template: Option<String>,
    pub templates_dir: PathBuf,
    pub sources_config: Option<PathBuf>,
    pub github_token: String,
    pub gemini_api_key: Option<String>,
    pub context_files: String,
    pub model: String,
    pub fallback_model: Option<String>,
    pub dry_run: bool,
    pub skip_setup: bool,
    pub agent: AgentKind,
    pub pull_request: PullRequestSettings,
    /// `GITHUB_ENV` file; `None` prints exports to stdout.
    pub github_env: Option<PathBuf>,
    /// Home directory for generated tool configs.
    pub home: Option<PathBuf>,
}

impl RunConfig {
    /// Credential bound to the agent CLI: the GitHub token for Copilot, the
    /// Gemini API key for Gemini.
    pub fn agent_token(&self) -> String {
        match self.agent {
            AgentKind::Copilot => self.github_token.clone(),
            AgentKind::Gemini => self.gemini_api_key.clone().unwrap_or_default(),
        }
    }

    /// Fallback model, with an empty value treated as none.
    pub fn fallback(&self) -> Option<String> {
        self.fallback_model.clone().filter(|m| !m.is_empty())
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("mission", &self.mission.as_ref().map(String::len))
            .field("template", &self.template)
            .field("sources_config", &self.sources_config)
            .field("has_github_token", &!self.github_token.is_empty())
            .field("has_gemini_api_key", &self.gemini_api_key.is_some())
            .field("context_files", &self.context_files)
            .field("model", &self.model)
            .field("fallback_model", &self.fallback_model)
            .field("dry_run", &self.dry_run)
            .field("skip_setup", &self.skip_setup)
            .field("agent", &self.agent)
            .finish_non_exhaustive()
    }
}
