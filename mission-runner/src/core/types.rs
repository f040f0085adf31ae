//! Shared deterministic types for a mission run.

/// Everything the executor needs for one mission, assembled once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentMissionRequest {
    /// Resolved mission text (inline `--mission` or template contents).
    pub mission_text: String,
    /// Context files descriptor passed through to the prompt (e.g. `.` or a glob).
    pub context_files: String,
    /// Model for the first attempt. Empty means "tool default".
    pub primary_model: String,
    /// Model for the single retry, if any.
    pub fallback_model: Option<String>,
    /// When set, the agent is told not to open a pull request.
    pub dry_run: bool,
    /// Credential bound to the agent CLI before running.
    pub auth_token: String,
}

/// Which attempt produced a successful mission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissionOutcome {
    Primary,
    Fallback { model: String },
}
