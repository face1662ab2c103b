use std::io::Write;
use std::process::{Command, Stdio};

/// The configured pager could not be run; callers fall back to plain output.
#[derive(Debug, thiserror::Error)]
#[error("pager `{command}` unavailable: {reason}")]
pub struct PagerUnavailable {
    pub command: String,
    pub reason: String,
}

/// `display.pager_command`, else `$PAGER`, else `less`. Blank values are skipped.
pub fn choose_pager(configured: Option<&str>, env_pager: Option<&str>) -> String {
    [configured, env_pager]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|command| !command.is_empty())
        .unwrap_or("less")
        .to_string()
}

pub fn default_pager(configured: Option<&str>) -> String {
    let env_pager = std::env::var("PAGER").ok();
    choose_pager(configured, env_pager.as_deref())
}

/// Runs `command` through `sh -c` with `text` on its stdin and waits for it.
/// `LESS=FRX` is set unless the user has their own `LESS`, so colors pass
/// through and output shorter than a screen exits straight away.
pub fn page(text: &str, command: &str) -> Result<(), PagerUnavailable> {
    let unavailable = |reason: String| PagerUnavailable {
        command: command.to_string(),
        reason,
    };

    let mut child = Command::new("sh");
    child.args(["-c", command]).stdin(Stdio::piped());
    if std::env::var_os("LESS").is_none() {
        child.env("LESS", "FRX");
    }
    let mut child = child.spawn().map_err(|e| unavailable(e.to_string()))?;

    if let Some(mut stdin) = child.stdin.take() {
        // The pager may quit before reading everything.
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            tracing::debug!(error = %e, "pager closed its input early");
        }
    }

    let status = child.wait().map_err(|e| unavailable(e.to_string()))?;
    match status.code() {
        Some(126) | Some(127) => Err(unavailable(format!("exited with {}", status))),
        _ => Ok(()),
    }
}
