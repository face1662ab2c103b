//! Token lookup for the configured GitHub host.

use std::path::PathBuf;
use std::process::Command;

use crate::config::GitHubConfig;
use crate::error::{GhxError, Result};

/// Where the token in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Env,
    Stored,
    Command,
}

/// Per-host token files, `<config_dir>/ghx/tokens/<host>`.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn default_location() -> Option<Self> {
        let config_dir = dirs::config_dir()?;
        Some(Self::new(config_dir.join("ghx").join("tokens")))
    }

    fn path(&self, host: &str) -> PathBuf {
        self.dir.join(host.replace('/', "_"))
    }

    pub fn get(&self, host: &str) -> Option<String> {
        let raw = std::fs::read_to_string(self.path(host)).ok()?;
        non_empty(&raw)
    }

    pub fn put(&self, host: &str, token: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(host), token)?;
        Ok(())
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let token = raw.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Runs `token_command` (e.g. `gh auth token`) through the shell.
fn run_token_command(command: &str) -> Option<String> {
    let output = Command::new("sh").args(["-c", command]).output().ok()?;
    if !output.status.success() {
        tracing::debug!(command, status = %output.status, "token command failed");
        return None;
    }
    non_empty(&String::from_utf8_lossy(&output.stdout))
}

/// Finds a token for `config.host`: the configured env var, then the stored
/// token, then `token_command`. A token from the command is stored so the
/// next run skips it.
pub fn resolve_token(
    config: &GitHubConfig,
    store: Option<&TokenStore>,
) -> Result<(String, TokenSource)> {
    let from_env = config
        .token_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok())
        .and_then(|raw| non_empty(&raw));
    if let Some(token) = from_env {
        return Ok((token, TokenSource::Env));
    }

    if let Some(token) = store.and_then(|s| s.get(&config.host)) {
        return Ok((token, TokenSource::Stored));
    }

    if let Some(token) = config.token_command.as_deref().and_then(run_token_command) {
        if let Some(store) = store {
            if let Err(e) = store.put(&config.host, &token) {
                tracing::warn!(host = %config.host, error = %e, "could not store token");
            }
        }
        return Ok((token, TokenSource::Command));
    }

    Err(GhxError::Auth(format!(
        "no token found for {}. Set {} or configure github.token_command",
        config.host,
        config.token_env.as_deref().unwrap_or("a token env var")
    )))
}

pub fn load_token(config: &GitHubConfig) -> Result<String> {
    let store = TokenStore::default_location();
    let (token, source) = resolve_token(config, store.as_ref())?;
    tracing::debug!(host = %config.host, ?source, "using token");
    Ok(token)
}
