//! I/O helpers for a mission run.

pub mod copilot_config;
pub mod github_auth;
pub mod github_env;
pub mod mission_text;
pub mod process;
pub mod sources;
pub mod workflow;
