//! Resolves the mission text from `--mission` or a named template.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Directory holding `<name>.md` mission templates, relative to the workspace.
pub const DEFAULT_TEMPLATES_DIR: &str = ".github/templates";

/// Invalid invocation detected before anything external runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("both 'mission' and 'template' provided")]
    BothMissionAndTemplate,
    #[error("neither 'mission' nor 'template' provided")]
    NoMission,
    #[error("template file not found: {}", .path.display())]
    TemplateNotFound { path: PathBuf },
}

/// Return the inline mission, or the contents of `<templates_dir>/<template>.md`.
///
/// Empty strings count as "not provided", so exactly one of the two must be non-empty.
pub fn resolve_mission(
    mission: Option<&str>,
    template: Option<&str>,
    templates_dir: &Path,
) -> Result<String, UsageError> {
    let mission = mission.filter(|m| !m.is_empty());
    let template = template.filter(|t| !t.is_empty());

    match (mission, template) {
        (Some(_), Some(_)) => Err(UsageError::BothMissionAndTemplate),
        (None, None) => Err(UsageError::NoMission),
        (Some(mission), None) => Ok(mission.to_string()),
        (None, Some(template)) => {
            let path = templates_dir.join(format!("{template}.md"));
            debug!(path = %path.display(), "reading mission template");
            fs::read_to_string(&path).map_err(|_| UsageError::TemplateNotFound { path })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_mission_is_returned_as_is() {
        let temp = tempfile::tempdir().expect("tempdir");
        let got = resolve_mission(Some("audit skills"), None, temp.path()).expect("resolve");
        assert_eq!(got, "audit skills");
    }

    #[test]
    fn template_is_read_from_templates_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("audit.md"), "# Audit\nDo the audit.\n").expect("write");

        let got = resolve_mission(None, Some("audit"), temp.path()).expect("resolve");
        assert_eq!(got, "# Audit\nDo the audit.\n");
    }

    #[test]
    fn both_empty_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(
            resolve_mission(Some(""), Some(""), temp.path()),
            Err(UsageError::NoMission)
        );
        assert_eq!(
            resolve_mission(None, None, temp.path()),
            Err(UsageError::NoMission)
        );
    }

    #[test]
    fn both_set_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(
            resolve_mission(Some("m"), Some("t"), temp.path()),
            Err(UsageError::BothMissionAndTemplate)
        );
    }

    #[test]
    fn missing_template_reports_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = resolve_mission(None, Some("nope"), temp.path()).unwrap_err();
        assert!(err.to_string().contains("nope.md"));
        assert!(matches!(err, UsageError::TemplateNotFound { .. }));
    }
}
