//! Headless `gh` authentication.
//!
//! `gh auth login --with-token` validates token scopes, which fails for the
//! fine-grained tokens CI hands out. Writing `hosts.yml` directly skips that
//! check; the only network call is an optional lookup of the token's login.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::io::workflow;

/// Login recorded when the token's owner cannot be determined.
pub const DEFAULT_LOGIN: &str = "headless-agent";

const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_HOST: &str = "github.com";

/// Resolves the account name behind a token.
pub trait IdentityLookup {
    fn login(&self, token: &str) -> Result<String>;
}

/// `GET /user` against the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubApi {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
}

impl GithubApi {
    pub fn new() -> Result<Self> {
        Self::with_base_url(GITHUB_API_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("mission-runner/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(15))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl IdentityLookup for GithubApi {
    #[instrument(skip_all)]
    fn login(&self, token: &str) -> Result<String> {
        let url = format!("{}/user", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("token {token}"))
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .with_context(|| format!("GET {url}"))?;
        if !response.status().is_success() {
            bail!("GitHub user lookup failed: {}", response.status());
        }
        let user: GithubUser = response.json().context("decode GitHub user")?;
        Ok(user.login)
    }
}

#[derive(Debug, Serialize)]
struct HostEntry<'a> {
    user: &'a str,
    oauth_token: &'a str,
    git_protocol: &'a str,
}

/// Result of [`configure_gh_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhAuth {
    pub login: String,
    pub hosts_path: PathBuf,
}

/// Write `<home>/.config/gh/hosts.yml` for `token`.
///
/// The login comes from `lookup`; any lookup failure falls back to [`DEFAULT_LOGIN`].
/// Errors when the token is empty or the file cannot be written.
#[instrument(skip_all, fields(home = %home.display()))]
pub fn configure_gh_auth<L: IdentityLookup + ?Sized>(
    lookup: &L,
    token: &str,
    home: &Path,
) -> Result<GhAuth> {
    if token.is_empty() {
        return Err(anyhow!("GitHub token is not set"));
    }
    workflow::notice("Configuring gh auth manually to bypass scope validation...");

    let login = match lookup.login(token) {
        Ok(login) if !login.is_empty() => {
            workflow::notice(format!("Detected username: {login}"));
            login
        }
        Ok(_) => DEFAULT_LOGIN.to_string(),
        Err(e) => {
            warn!(err = %format!("{e:#}"), "login lookup failed, using default");
            DEFAULT_LOGIN.to_string()
        }
    };

    let hosts_path = home.join(".config").join("gh").join("hosts.yml");
    write_hosts_file(&hosts_path, &render_hosts(&login, token)?)?;

    info!(login = %login, "gh auth configured");
    workflow::notice("gh auth configured successfully.");
    Ok(GhAuth { login, hosts_path })
}

fn render_hosts(login: &str, token: &str) -> Result<String> {
    let hosts = BTreeMap::from([(
        GITHUB_HOST,
        HostEntry {
            user: login,
            oauth_token: token,
            git_protocol: "https",
        },
    )]);
    serde_yaml::to_string(&hosts).context("serialize gh hosts")
}

fn write_hosts_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create gh config dir {}", parent.display()))?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // `mode` only applies on create; tighten a pre-existing file as well.
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("chmod {}", path.display()))?;
    }
    file.write_all(contents.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    debug!(path = %path.display(), "wrote gh hosts file");
    Ok(())
}
