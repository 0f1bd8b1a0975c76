// System clipboard access through external commands.
//
// Each candidate is a program that reads the text from stdin. The configured
// command goes first, followed by the usual platform tools; the first one
// that exits successfully wins.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use sentencebox_core::config::ClipboardConfig;

/// How long a single clipboard command may run.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("`{program}` exited unsuccessfully")]
    Exit { program: String },

    #[error("`{program}` timed out")]
    Timeout { program: String },

    #[error("no clipboard command succeeded (tried: {tried})")]
    Unavailable { tried: String },
}

#[derive(Debug, Clone)]
pub struct Clipboard {
    candidates: Vec<Vec<String>>,
}

impl Clipboard {
    pub fn from_config(config: &ClipboardConfig) -> Self {
        let mut candidates = Vec::new();
        if let Some(cmd) = config.command.as_ref().filter(|c| !c.is_empty()) {
            candidates.push(cmd.clone());
        }
        candidates.extend(platform_candidates());
        Clipboard { candidates }
    }

    pub fn with_candidates(candidates: Vec<Vec<String>>) -> Self {
        Clipboard {
            candidates: candidates.into_iter().filter(|c| !c.is_empty()).collect(),
        }
    }

    pub fn candidates(&self) -> &[Vec<String>] {
        &self.candidates
    }

    /// Copy `text`, returning the program that accepted it.
    pub async fn copy(&self, text: &str) -> Result<String, ClipboardError> {
        for candidate in &self.candidates {
            match run_one(candidate, text).await {
                Ok(()) => return Ok(candidate[0].clone()),
                Err(e) => debug!("Clipboard candidate failed: {}", e),
            }
        }
        let tried = self
            .candidates
            .iter()
            .map(|c| c[0].as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(ClipboardError::Unavailable { tried })
    }
}

fn platform_candidates() -> Vec<Vec<String>> {
    let raw: &[&[&str]] = if cfg!(target_os = "macos") {
        &[&["pbcopy"]]
    } else if cfg!(windows) {
        &[&["clip"]]
    } else {
        &[
            &["wl-copy"],
            &["xclip", "-selection", "clipboard"],
            &["xsel", "--clipboard", "--input"],
        ]
    };
    raw.iter()
        .map(|cmd| cmd.iter().map(|s| s.to_string()).collect())
        .collect()
}

async fn run_one(command: &[String], text: &str) -> Result<(), ClipboardError> {
    let program = command[0].clone();
    let mut child = Command::new(&program)
        .args(&command[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ClipboardError::Spawn {
            program: program.clone(),
            source,
        })?;

    let feed_and_wait = async {
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            // Closing stdin signals EOF to the clipboard tool.
            drop(stdin);
        }
        child.wait().await
    };

    match tokio::time::timeout(COMMAND_TIMEOUT, feed_and_wait).await {
        Ok(Ok(status)) if status.success() => Ok(()),
        Ok(Ok(_)) => Err(ClipboardError::Exit { program }),
        Ok(Err(source)) => Err(ClipboardError::Spawn { program, source }),
        Err(_) => Err(ClipboardError::Timeout { program }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
