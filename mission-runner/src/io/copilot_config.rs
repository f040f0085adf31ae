//! Copilot CLI MCP configuration (`~/.config/github-copilot/config.json`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::instrument;

use crate::core::sources::McpServerSpec;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CopilotConfig<'a> {
    mcp_servers: &'a BTreeMap<String, McpServerSpec>,
}

/// `<home>/.config/github-copilot/config.json`.
pub fn copilot_config_path(home: &Path) -> PathBuf {
    home.join(".config")
        .join("github-copilot")
        .join("config.json")
}

/// Serialize `{"mcpServers": ...}` as pretty JSON with trailing newline.
pub fn render_copilot_config(servers: &BTreeMap<String, McpServerSpec>) -> Result<String> {
    let mut payload = serde_json::to_string_pretty(&CopilotConfig {
        mcp_servers: servers,
    })
    .context("serialize copilot config")?;
    payload.push('\n');
    Ok(payload)
}

/// Write the Copilot config under `home`, returning the path and rendered JSON.
#[instrument(skip_all, fields(home = %home.display(), servers = servers.len()))]
pub fn write_copilot_config(
    home: &Path,
    servers: &BTreeMap<String, McpServerSpec>,
) -> Result<(PathBuf, String)> {
    let path = copilot_config_path(home);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config dir {}", parent.display()))?;
    }
    let payload = render_copilot_config(servers)?;
    fs::write(&path, &payload).with_context(|| format!("write {}", path.display()))?;
    Ok((path, payload))
}
