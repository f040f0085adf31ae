//! GitHub Copilot through the `gh copilot` extension.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use crate::io::process::{CommandRunner, CommandSpec};
use crate::io::workflow;

use super::AgentCli;

const COPILOT_EXTENSION: &str = "github/gh-copilot";
const KEYRING_URL: &str = "https://cli.github.com/packages/githubcli-archive-keyring.gpg";
const KEYRING_PATH: &str = "/usr/share/keyrings/githubcli-archive-keyring.gpg";

/// Copilot strategy; holds the GitHub token bound by `authenticate`.
#[derive(Debug, Clone, Default)]
pub struct CopilotCli {
    token: String,
}

impl CopilotCli {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Build the `gh copilot` invocation for `prompt`.
    pub fn command(&self, prompt: &str, model: &str) -> CommandSpec {
        let mut cmd = CommandSpec::new("gh").args(["copilot", "--allow-all-tools", "-p", prompt]);
        if !model.is_empty() {
            cmd = cmd.args(["--model", model]);
        }
        cmd.env("COPILOT_GITHUB_TOKEN", &self.token)
            .env("GITHUB_TOKEN", &self.token)
    }
}

/// apt steps that install `gh` from the official package repository.
///
/// The keyring is downloaded to `keyring_download` first so a failed fetch
/// stops the install instead of leaving an empty keyring behind.
fn gh_install_commands(keyring_download: &Path) -> Vec<CommandSpec> {
    let download = keyring_download.display().to_string();
    vec![
        CommandSpec::new("curl").args(["-fsSL", "-o", download.as_str(), KEYRING_URL]),
        CommandSpec::new("sudo").args(["install", "-m", "0644", download.as_str(), KEYRING_PATH]),
        CommandSpec::new("sh").args([
            "-c".to_string(),
            format!(
                "echo \"deb [arch=$(dpkg --print-architecture) signed-by={KEYRING_PATH}] \
                 https://cli.github.com/packages stable main\" \
                 | sudo tee /etc/apt/sources.list.d/github-cli.list > /dev/null"
            ),
        ]),
        CommandSpec::new("sudo").args(["apt-get", "update", "-qq"]),
        CommandSpec::new("sudo").args(["apt-get", "install", "-y", "-qq", "gh"]),
    ]
}

fn gh_available<R: CommandRunner + ?Sized>(runner: &R) -> bool {
    runner
        .capture(&CommandSpec::new("gh").arg("--version"))
        .map(|out| out.success)
        .unwrap_or(false)
}

fn extension_installed<R: CommandRunner + ?Sized>(runner: &R) -> bool {
    runner
        .capture(&CommandSpec::new("gh").args(["extension", "list"]))
        .map(|out| out.success && out.stdout.contains(COPILOT_EXTENSION))
        .unwrap_or(false)
}

impl AgentCli for CopilotCli {
    fn name(&self) -> &'static str {
        "copilot"
    }

    #[instrument(skip_all)]
    fn install<R: CommandRunner + ?Sized>(&self, runner: &R) -> Result<()> {
        {
            let _group = workflow::group("Installing GitHub CLI (Copilot Requirement)");
            if gh_available(runner) {
                workflow::notice("GitHub CLI is already installed.");
            } else {
                let scratch = tempfile::Builder::new()
                    .prefix("gh-keyring-")
                    .tempdir()
                    .context("create keyring download dir")?;
                let keyring = scratch.path().join("githubcli-archive-keyring.gpg");
                for cmd in gh_install_commands(&keyring) {
                    runner
                        .run(&cmd)
                        .with_context(|| format!("failed to run {}", cmd.display_line()))?;
                }
            }
        }

        let _group = workflow::group("Installing gh-copilot extension");
        if extension_installed(runner) {
            workflow::notice("gh-copilot is already available.");
            return Ok(());
        }
        workflow::notice(format!("Installing {COPILOT_EXTENSION} extension..."));
        runner
            .run(&CommandSpec::new("gh").args([
                "extension",
                "install",
                COPILOT_EXTENSION,
                "--force",
            ]))
            .context("install gh-copilot extension")
    }

    fn authenticate(&mut self, token: &str) -> Result<()> {
        self.token = token.to_string();
        Ok(())
    }

    #[instrument(skip_all, fields(model = %model))]
    fn run<R: CommandRunner + ?Sized>(
        &self,
        runner: &R,
        prompt: &str,
        model: &str,
    ) -> Result<()> {
        if self.token.is_empty() {
            return Err(anyhow!("token not set, call authenticate first"));
        }
        workflow::notice(format!("Running copilot agent with model: {model}"));
        debug!(prompt_bytes = prompt.len(), "invoking gh copilot");
        runner
            .run(&self.command(prompt, model))
            .context("gh copilot failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedRunner;

    #[test]
    fn install_runs_apt_and_extension_when_missing() {
        // gh --version fails, extension list fails -> full install.
        let runner = ScriptedRunner::new()
            .with_capture_failure("gh --version")
            .with_capture_failure("gh extension list");
        let copilot = CopilotCli::default();

        copilot.install(&runner).expect("install");

        let runs = runner.run_lines();
        assert_eq!(runs.len(), 6);
        assert!(runs[0].starts_with("curl -fsSL -o "));
        assert!(runs[1].starts_with("sudo install -m 0644 "));
        assert!(runs[1].ends_with(KEYRING_PATH));
        assert_eq!(runs[3], "sudo apt-get update -qq");
        assert_eq!(runs[4], "sudo apt-get install -y -qq gh");
        assert_eq!(runs[5], "gh extension install github/gh-copilot --force");
    }

    #[test]
    fn install_is_a_no_op_when_everything_is_present() {
        let runner = ScriptedRunner::new()
            .with_capture_stdout("gh extension list", "gh copilot\tgithub/gh-copilot\tv1.0.0\n");
        let copilot = CopilotCli::default();

        copilot.install(&runner).expect("install");

        assert!(runner.run_lines().is_empty());
        assert_eq!(runner.capture_lines(), vec!["gh --version", "gh extension list"]);
    }

    #[test]
    fn install_stops_at_first_failing_step() {
        let runner = ScriptedRunner::new()
            .with_capture_failure("gh --version")
            .with_run_failure("sudo apt-get update -qq");
        let copilot = CopilotCli::default();

        let err = copilot.install(&runner).unwrap_err();

        assert!(format!("{err:#}").contains("sudo apt-get update -qq"));
        assert_eq!(runner.run_lines().len(), 4);
    }

    #[test]
    fn keyring_download_is_its_own_step() {
        let download = Path::new("/tmp/scratch/keyring.gpg");
        let steps = gh_install_commands(download);

        assert_eq!(steps[0].program, "curl");
        assert_eq!(
            steps[0].args,
            vec!["-fsSL", "-o", "/tmp/scratch/keyring.gpg", KEYRING_URL]
        );
        assert_eq!(
            steps[1].args,
            vec!["install", "-m", "0644", "/tmp/scratch/keyring.gpg", KEYRING_PATH]
        );
        assert!(steps.iter().all(|step| !step.display_line().contains("| sudo dd")));
    }

    #[test]
    fn failed_keyring_download_stops_the_install() {
        let runner = ScriptedRunner::new()
            .with_capture_failure("gh --version")
            .with_run_failure_prefix("curl -fsSL -o ");
        let copilot = CopilotCli::default();

        let err = copilot.install(&runner).unwrap_err();

        assert!(format!("{err:#}").contains(KEYRING_URL));
        assert_eq!(runner.run_lines().len(), 1);
    }

    #[test]
    fn run_passes_prompt_model_and_token() {
        let runner = ScriptedRunner::new();
        let mut copilot = CopilotCli::default();
        copilot.authenticate("ghs_token").expect("auth");

        copilot.run(&runner, "do it", "gpt-5").expect("run");

        let calls = runner.runs();
        assert_eq!(calls.len(), 1);
        let cmd = &calls[0];
        assert_eq!(cmd.program, "gh");
        assert_eq!(
            cmd.args,
            vec!["copilot", "--allow-all-tools", "-p", "do it", "--model", "gpt-5"]
        );
        assert!(cmd
            .envs
            .contains(&("COPILOT_GITHUB_TOKEN".to_string(), "ghs_token".to_string())));
        assert!(cmd
            .envs
            .contains(&("GITHUB_TOKEN".to_string(), "ghs_token".to_string())));
    }

    #[test]
    fn run_omits_model_flag_when_empty() {
        let cmd = CopilotCli::with_token("t").command("p", "");
        assert!(!cmd.args.iter().any(|a| a == "--model"));
    }

    #[test]
    fn run_without_token_fails_before_spawning() {
        let runner = ScriptedRunner::new();
        let copilot = CopilotCli::default();

        let err = copilot.run(&runner, "p", "m").unwrap_err();

        assert!(err.to_string().contains("token not set"));
        assert!(runner.runs().is_empty());
    }
}
