//! Gemini through the `generateContent` REST endpoint, driven with `curl`.

use std::io::Write;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tempfile::Builder;
use tracing::{debug, instrument};

use crate::io::process::{CommandRunner, CommandSpec};
use crate::io::workflow;

use super::AgentCli;

/// Model used when none is given.
pub const DEFAULT_MODEL: &str = "gemini-pro";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Gemini strategy; holds the API key bound by `authenticate`.
#[derive(Debug, Clone, Default)]
pub struct GeminiCli {
    api_key: String,
}

impl GeminiCli {
    /// `curl` invocation posting the JSON body stored at `body_path`.
    pub fn command(&self, model: &str, body_path: &str) -> CommandSpec {
        CommandSpec::new("curl").args([
            "-s".to_string(),
            // Show errors despite -s.
            "-S".to_string(),
            // Non-2xx responses fail the command.
            "-f".to_string(),
            "-X".to_string(),
            "POST".to_string(),
            endpoint(model),
            "-H".to_string(),
            "Content-Type: application/json".to_string(),
            "-H".to_string(),
            format!("x-goog-api-key: {}", self.api_key),
            "-d".to_string(),
            format!("@{body_path}"),
        ])
    }
}

/// `generateContent` URL for `model`, defaulting to [`DEFAULT_MODEL`].
pub fn endpoint(model: &str) -> String {
    let model = if model.is_empty() { DEFAULT_MODEL } else { model };
    format!("{API_BASE}/{model}:generateContent")
}

/// JSON body for a single-turn text prompt.
pub fn request_body(prompt: &str) -> Result<String> {
    let body = GenerateRequest {
        contents: [Content {
            parts: [Part { text: prompt }],
        }],
    };
    serde_json::to_string(&body).context("serialize gemini request")
}

impl AgentCli for GeminiCli {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[instrument(skip_all)]
    fn install<R: CommandRunner + ?Sized>(&self, runner: &R) -> Result<()> {
        let _group = workflow::group("Verifying curl for Gemini");
        runner
            .run(&CommandSpec::new("curl").arg("--version"))
            .context("curl is required for Gemini but was not found")
    }

    fn authenticate(&mut self, token: &str) -> Result<()> {
        self.api_key = token.to_string();
        Ok(())
    }

    #[instrument(skip_all, fields(model = %model))]
    fn run<R: CommandRunner + ?Sized>(
        &self,
        runner: &R,
        prompt: &str,
        model: &str,
    ) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(anyhow!(
                "token (GEMINI_API_KEY) not set, call authenticate first"
            ));
        }
        let model = if model.is_empty() { DEFAULT_MODEL } else { model };

        // Kept alive until curl has read it; removed on drop.
        let mut body_file = Builder::new()
            .prefix("gemini-req-")
            .suffix(".json")
            .tempfile()
            .context("create gemini request file")?;
        body_file
            .write_all(request_body(prompt)?.as_bytes())
            .context("write gemini request file")?;
        body_file.flush().context("flush gemini request file")?;
        let body_path = body_file.path().to_string_lossy().into_owned();

        workflow::notice(format!("Running gemini agent with model: {model}"));
        debug!(prompt_bytes = prompt.len(), "invoking curl generateContent");
        runner
            .run(&self.command(model, &body_path))
            .context("gemini request failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedRunner;

    #[test]
    fn install_checks_curl() {
        let runner = ScriptedRunner::new();
        GeminiCli::default().install(&runner).expect("install");
        assert_eq!(runner.run_lines(), vec!["curl --version"]);
    }

    #[test]
    fn install_reports_missing_curl() {
        let runner = ScriptedRunner::new().with_run_failure("curl --version");
        let err = GeminiCli::default().install(&runner).unwrap_err();
        assert!(err.to_string().contains("curl is required"));
    }

    #[test]
    fn run_posts_to_generate_content_with_key_header() {
        let runner = ScriptedRunner::new();
        let mut gemini = GeminiCli::default();
        gemini.authenticate("test-key").expect("auth");

        gemini.run(&runner, "prompt", "gemini-2.5-pro").expect("run");

        let calls = runner.runs();
        assert_eq!(calls.len(), 1);
        let args = &calls[0].args;
        assert_eq!(calls[0].program, "curl");
        assert!(args.iter().any(|a| a == "-f"));
        assert!(args.iter().any(|a| a == "-S"));
        assert!(args.contains(
            &"https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
                .to_string()
        ));
        assert!(args.contains(&"x-goog-api-key: test-key".to_string()));
        assert!(args.last().is_some_and(|a| a.starts_with('@')));
    }

    #[test]
    fn empty_model_uses_default() {
        assert!(endpoint("").contains("/gemini-pro:generateContent"));
    }

    #[test]
    fn request_body_wraps_prompt() {
        let body: serde_json::Value =
            serde_json::from_str(&request_body("hi \"there\"").expect("body")).expect("json");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi \"there\"");
    }

    #[test]
    fn run_without_key_fails_before_spawning() {
        let runner = ScriptedRunner::new();
        let err = GeminiCli::default().run(&runner, "p", "").unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        assert!(runner.runs().is_empty());
    }
}
