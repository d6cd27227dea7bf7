//! Replay transport
//!
//! Feeds a JSON-lines script through the same request channel the bus uses.
//! Each line is `{"command": "make_box", "params": {"reference": "b"}}`.
//! Blank lines and lines starting with `#` are skipped; malformed lines are
//! reported with their line number and skipped.

use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread::JoinHandle;
use thiserror::Error;

use crate::api::{Command, Params};
use crate::bus_bridge::RequestSender;
use crate::error::StartupError;

#[derive(Debug, Deserialize)]
struct ScriptLine {
    command: String,
    #[serde(default)]
    params: Params,
}

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: unknown command {command}")]
    UnknownCommand { line: usize, command: String },
}

/// Parse one script line; `None` for blank lines and comments
pub fn parse_line(line: usize, text: &str) -> Option<Result<(Command, Params), ReplayError>> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return None;
    }
    let parsed: ScriptLine = match serde_json::from_str(text) {
        Ok(parsed) => parsed,
        Err(source) => return Some(Err(ReplayError::Malformed { line, source })),
    };
    Some(match Command::from_name(&parsed.command) {
        Some(command) => Ok((command, parsed.params)),
        None => Err(ReplayError::UnknownCommand {
            line,
            command: parsed.command,
        }),
    })
}

/// Send every call of `script` in order, stopping after an accepted `stop`
pub fn play(script: impl BufRead, requests: &RequestSender) {
    for (index, text) in script.lines().enumerate() {
        let line = index + 1;
        let text = match text {
            Ok(text) => text,
            Err(e) => {
                log::error!("[Replay] Read failed at line {}: {}", line, e);
                break;
            }
        };
        let (command, params) = match parse_line(line, &text) {
            None => continue,
            Some(Ok(call)) => call,
            Some(Err(e)) => {
                log::warn!("[Replay] Skipping {}", e);
                continue;
            }
        };

        match requests.call(command, params) {
            Ok(outcome) => {
                log::info!("[Replay] {} {} -> {}", line, command.name(), outcome.message());
                if command == Command::Stop && outcome.is_accepted() {
                    return;
                }
            }
            Err(message) => {
                log::error!("[Replay] {} {} failed: {}", line, command.name(), message);
            }
        }
    }
    log::warn!("[Replay] Script ended without stop");
}

/// Open `path` and play it on a background thread
pub fn spawn(path: &Path, requests: RequestSender) -> Result<JoinHandle<()>, StartupError> {
    let file = File::open(path).map_err(|source| StartupError::Replay {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("[Replay] Playing {}", path.display());
    Ok(std::thread::spawn(move || {
        play(BufReader::new(file), &requests)
    }))
}
