//! CI helper that drives an AI coding agent through a single mission.
//!
//! A run resolves the mission text, prepares the chosen agent CLI (Copilot or
//! Gemini), turns the sources config into MCP servers and prompt hints, and
//! invokes the agent with a primary model and an optional fallback model.
//!
//! - **[`core`]**: Pure, deterministic logic (source processing, prompt text).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (filesystem, subprocesses, HTTP,
//!   workflow output). Isolated behind traits so tests can swap in fakes.
//! - **[`agents`]**: The agent CLI strategies built on top of [`io::process`].
//!
//! [`mission`] implements the primary/fallback policy and [`app`] wires the
//! whole run together.

pub mod agents;
pub mod app;
pub mod config;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod mission;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
