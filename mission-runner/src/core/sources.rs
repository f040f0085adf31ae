//! Turns declared sources into MCP server definitions and prompt hints.
//!
//! Sources are read from YAML (see `io::sources`); this module only applies
//! the enable/type rules, so the same input always yields the same output.

use std::collections::BTreeMap;

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

/// Command used to launch every MCP server package.
pub const MCP_COMMAND: &str = "npx";

/// Sentence that introduces the web source list in the prompt.
pub const WEB_SOURCES_PREFIX: &str = "Also consult these documentation sources: ";

/// Kind of a declared source. Unknown kinds are kept as [`SourceKind::Other`]
/// so a typo disables one entry instead of failing the whole file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Mcp,
    Web,
    #[default]
    #[serde(other)]
    Other,
}

/// One entry of the sources config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub package: Option<String>,
    pub url: Option<String>,
    #[serde(deserialize_with = "yaml_flag")]
    pub enabled: bool,
}

/// A boolean that also accepts the YAML 1.1 spellings (`yes`, `no`, `on`,
/// `off`, `y`, `n`) in any case. `null` reads as `false`.
fn yaml_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Flag::Bool(flag)) => Ok(flag),
        Some(Flag::Text(text)) => match text.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "on" => Ok(true),
            "false" | "no" | "n" | "off" => Ok(false),
            _ => Err(de::Error::invalid_value(
                Unexpected::Str(&text),
                &"a boolean (true/false, yes/no, on/off)",
            )),
        },
    }
}

/// Launch descriptor for one MCP server, in the shape agent tools expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerSpec {
    pub command: String,
    pub args: Vec<String>,
}

impl McpServerSpec {
    /// `npx -y <package>`.
    pub fn for_package(package: &str) -> Self {
        Self {
            command: MCP_COMMAND.to_string(),
            args: vec!["-y".to_string(), package.to_string()],
        }
    }
}

/// Result of processing the sources config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedSources {
    /// Server name -> launch spec. Later entries with the same name win.
    pub mcp_servers: BTreeMap<String, McpServerSpec>,
    /// Packages of enabled MCP sources, in declaration order (not deduplicated).
    pub mcp_packages: Vec<String>,
    /// Prompt sentence listing web sources, or empty when there are none.
    pub web_sources: String,
}

impl ProcessedSources {
    pub fn is_empty(&self) -> bool {
        self.mcp_servers.is_empty() && self.mcp_packages.is_empty() && self.web_sources.is_empty()
    }
}

/// Partition enabled sources into MCP servers and web URLs.
pub fn process_sources(sources: &[Source]) -> ProcessedSources {
    let mut processed = ProcessedSources::default();
    let mut web_urls: Vec<&str> = Vec::new();

    for source in sources.iter().filter(|s| s.enabled) {
        match source.kind {
            SourceKind::Mcp => {
                if let Some(package) = non_empty(source.package.as_deref()) {
                    processed
                        .mcp_servers
                        .insert(source.name.clone(), McpServerSpec::for_package(package));
                    processed.mcp_packages.push(package.to_string());
                }
            }
            SourceKind::Web => {
                if let Some(url) = non_empty(source.url.as_deref()) {
                    web_urls.push(url);
                }
            }
            SourceKind::Other => {}
        }
    }

    if !web_urls.is_empty() {
        processed.web_sources = format!("{WEB_SOURCES_PREFIX}{}", web_urls.join(", "));
    }
    processed
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcp(name: &str, package: &str, enabled: bool) -> Source {
        Source {
            name: name.to_string(),
            kind: SourceKind::Mcp,
            package: Some(package.to_string()),
            url: None,
            enabled,
        }
    }

    fn web(name: &str, url: &str, enabled: bool) -> Source {
        Source {
            name: name.to_string(),
            kind: SourceKind::Web,
            package: None,
            url: Some(url.to_string()),
            enabled,
        }
    }

    #[test]
    fn mixed_sources_partition_into_servers_and_web() {
        let sources = vec![
            mcp("a", "pkg1", true),
            web("b", "https://x.test", true),
            mcp("c", "pkg2", false),
        ];

        let processed = process_sources(&sources);

        assert_eq!(processed.mcp_servers.len(), 1);
        assert_eq!(
            processed.mcp_servers["a"],
            McpServerSpec {
                command: "npx".to_string(),
                args: vec!["-y".to_string(), "pkg1".to_string()],
            }
        );
        assert_eq!(processed.mcp_packages, vec!["pkg1"]);
        assert_eq!(
            processed.web_sources,
            "Also consult these documentation sources: https://x.test"
        );
    }

    #[test]
    fn web_urls_join_in_input_order() {
        let sources = vec![
            web("one", "https://b.test", true),
            web("two", "https://a.test", true),
            web("off", "https://off.test", false),
            web("three", "https://c.test", true),
        ];

        let processed = process_sources(&sources);

        assert_eq!(
            processed.web_sources,
            "Also consult these documentation sources: https://b.test, https://a.test, https://c.test"
        );
        assert!(processed.mcp_servers.is_empty());
    }

    #[test]
    fn duplicate_mcp_names_keep_last_server_but_all_packages() {
        let sources = vec![mcp("dup", "first", true), mcp("dup", "second", true)];

        let processed = process_sources(&sources);

        assert_eq!(processed.mcp_servers.len(), 1);
        assert_eq!(processed.mcp_servers["dup"].args[1], "second");
        assert_eq!(processed.mcp_packages, vec!["first", "second"]);
    }

    #[test]
    fn incomplete_and_other_entries_contribute_nothing() {
        let sources = vec![
            mcp("empty-pkg", "", true),
            Source {
                name: "no-pkg".to_string(),
                kind: SourceKind::Mcp,
                enabled: true,
                ..Source::default()
            },
            web("empty-url", "", true),
            Source {
                name: "misc".to_string(),
                kind: SourceKind::Other,
                package: Some("pkg".to_string()),
                url: Some("https://misc.test".to_string()),
                enabled: true,
            },
        ];

        let processed = process_sources(&sources);

        assert!(processed.is_empty());
        assert_eq!(processed.web_sources, "");
    }

    #[test]
    fn disabled_sources_never_appear() {
        let sources = vec![mcp("a", "pkg", false), web("b", "https://x.test", false)];

        let processed = process_sources(&sources);

        assert_eq!(processed, ProcessedSources::default());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let processed = process_sources(&[mcp("a", "pkg1", true)]);
        let value = serde_json::to_value(&processed).expect("serialize");

        assert_eq!(value["mcpServers"]["a"]["command"], "npx");
        assert_eq!(value["mcpPackages"][0], "pkg1");
        assert_eq!(value["webSources"], "");
    }
}
