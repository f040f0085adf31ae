//! Loads the sources config (YAML) and processes it.
//!
//! The canonical file is a top-level sequence of sources:
//!
//! ```yaml
//! - name: context7
//!   type: mcp
//!   package: "@upstash/context7-mcp"
//!   enabled: true
//! - name: rust-docs
//!   type: web
//!   url: https://doc.rust-lang.org
//!   enabled: true
//! ```
//!
//! `enabled` also takes the YAML 1.1 spellings (`yes`/`no`, `on`/`off`), and a
//! file holding only `~` declares no sources. A mapping with a `sources:` list
//! is still accepted but deprecated.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::core::sources::{ProcessedSources, Source, process_sources};

/// Default location of the sources config, relative to the workspace.
pub const DEFAULT_SOURCES_CONFIG: &str = ".github/sources.yml";

#[derive(Debug, Deserialize)]
struct LegacySourcesFile {
    sources: Vec<Source>,
}

/// Read sources from `path`.
///
/// `None`, an empty path, or a missing file yield no sources (not an error).
#[instrument(skip_all, fields(path = ?path))]
pub fn load_sources(path: Option<&Path>) -> Result<Vec<Source>> {
    let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
        debug!("no sources config given");
        return Ok(Vec::new());
    };

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("sources config missing, using empty set");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };

    parse_sources(&contents).with_context(|| format!("parse {}", path.display()))
}

/// Parse the canonical sequence shape, falling back to the deprecated
/// `sources:` mapping. On failure the canonical error is reported.
pub fn parse_sources(contents: &str) -> Result<Vec<Source>> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_yaml::from_str::<Option<Vec<Source>>>(contents) {
        Ok(sources) => Ok(sources.unwrap_or_default()),
        Err(primary) => match serde_yaml::from_str::<LegacySourcesFile>(contents) {
            Ok(legacy) => {
                warn!("`sources:` mapping is deprecated; use a top-level list of sources");
                Ok(legacy.sources)
            }
            Err(_) => Err(primary).context("expected a YAML list of sources"),
        },
    }
}

/// Load and process the sources config in one step.
pub fn load_processed_sources(path: Option<&Path>) -> Result<ProcessedSources> {
    let sources = load_sources(path)?;
    let processed = process_sources(&sources);
    debug!(
        declared = sources.len(),
        mcp_servers = processed.mcp_servers.len(),
        has_web_sources = !processed.web_sources.is_empty(),
        "processed sources"
    );
    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sources::SourceKind;

    const SCENARIO: &str = r#"
- name: a
  type: mcp
  package: pkg1
  enabled: true
- name: b
  type: web
  url: "https://x.test"
  enabled: true
- name: c
  type: mcp
  package: pkg2
  enabled: false
"#;

    #[test]
    fn missing_path_and_missing_file_are_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(load_sources(None).expect("none").is_empty());
        assert!(load_sources(Some(Path::new(""))).expect("empty").is_empty());
        let processed =
            load_processed_sources(Some(&temp.path().join("sources.yml"))).expect("missing");
        assert_eq!(processed, ProcessedSources::default());
    }

    #[test]
    fn scenario_file_is_processed() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("sources.yml");
        fs::write(&path, SCENARIO).expect("write");

        let processed = load_processed_sources(Some(&path)).expect("load");

        assert_eq!(processed.mcp_servers.len(), 1);
        assert_eq!(processed.mcp_servers["a"].command, "npx");
        assert_eq!(processed.mcp_servers["a"].args, vec!["-y", "pkg1"]);
        assert_eq!(processed.mcp_packages, vec!["pkg1"]);
        assert_eq!(
            processed.web_sources,
            "Also consult these documentation sources: https://x.test"
        );
    }

    #[test]
    fn missing_fields_take_defaults_and_unknown_type_is_other() {
        let sources = parse_sources(
            r#"
- name: docs
  type: wiki
  url: https://wiki.test
  enabled: true
- name: quiet
  type: mcp
  package: pkg
"#,
        )
        .expect("parse");

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].kind, SourceKind::Other);
        assert!(!sources[1].enabled);
        assert!(process_sources(&sources).is_empty());
    }

    #[test]
    fn legacy_mapping_shape_is_accepted() {
        let sources = parse_sources(
            r#"
sources:
  - name: a
    type: mcp
    package: pkg1
    enabled: true
"#,
        )
        .expect("parse");

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].package.as_deref(), Some("pkg1"));
    }

    #[test]
    fn undecodable_file_reports_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("sources.yml");
        fs::write(&path, "- name: [unterminated\n").expect("write");

        let err = load_sources(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("parse"));
    }

    #[test]
    fn empty_file_is_empty() {
        assert!(parse_sources("\n").expect("parse").is_empty());
    }

    #[test]
    fn null_document_is_empty() {
        assert!(parse_sources("~\n").expect("tilde").is_empty());
        assert!(parse_sources("null").expect("null").is_empty());
    }

    #[test]
    fn enabled_accepts_yaml_1_1_booleans() {
        let sources = parse_sources(
            r#"
- name: a
  type: mcp
  package: pkg1
  enabled: yes
- name: b
  type: mcp
  package: pkg2
  enabled: "On"
- name: c
  type: web
  url: https://c.test
  enabled: no
- name: d
  type: web
  url: https://d.test
  enabled: ~
"#,
        )
        .expect("parse");

        let enabled: Vec<bool> = sources.iter().map(|s| s.enabled).collect();
        assert_eq!(enabled, vec![true, true, false, false]);
        assert_eq!(process_sources(&sources).mcp_packages, vec!["pkg1", "pkg2"]);
    }

    #[test]
    fn unrecognised_enabled_value_is_an_error() {
        let err = parse_sources("- name: a\n  type: mcp\n  enabled: maybe\n").unwrap_err();
        assert!(format!("{err:#}").contains("maybe"), "{err:#}");
    }
}
