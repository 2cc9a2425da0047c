//! Adapter for the external safe-rm tool: subprocess calls for the
//! operations it owns, direct reads of its trash directory for item
//! inspection, and the deletion-guidance message.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::Config;
use crate::protocol::ToolResult;

/// Trash entries are named `<date>_<time>_<basename>`. IDs that do not
/// match are refused before any subprocess is spawned.
static TRASH_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{8}_[0-9]{6}_[\w\-\.]+$").expect("valid pattern"));

const DELETION_LOG: &str = ".deletion-log";

#[derive(Debug, Serialize)]
struct TrashItemInfo {
    trash_id: String,
    original_path: String,
    #[serde(rename = "type")]
    kind: &'static str,
    deleted_date: String,
    size_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct SafeRm {
    config: Config,
}

impl SafeRm {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn list_trash(&self) -> ToolResult {
        ToolResult::text(self.exec(&["--list-trash"]).await)
    }

    pub async fn status(&self) -> ToolResult {
        ToolResult::text(self.exec(&["--status"]).await)
    }

    pub async fn clean_old(&self) -> ToolResult {
        ToolResult::text(self.exec(&["--clean-old"]).await)
    }

    /// Restore an item from trash. Empty tool output is reported as a
    /// synthesized confirmation.
    pub async fn restore(&self, trash_id: &str) -> ToolResult {
        if !TRASH_ID_PATTERN.is_match(trash_id) {
            return ToolResult::error("Error: Invalid trash_id format");
        }
        let output = self.exec(&["--restore", trash_id]).await;
        if output.is_empty() {
            ToolResult::text(format!("Restored: {trash_id}"))
        } else {
            ToolResult::text(output)
        }
    }

    /// Inspect one trash entry without involving the external tool:
    /// stat the entry, then recover its original path from the log.
    pub async fn trash_info(&self, trash_id: &str) -> ToolResult {
        let entry = self.config.trash_dir.join(trash_id);
        let metadata = match tokio::fs::metadata(&entry).await {
            Ok(metadata) => metadata,
            Err(_) => return ToolResult::error(format!("Error: Item not found: {trash_id}")),
        };

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let info = TrashItemInfo {
            trash_id: trash_id.to_string(),
            original_path: self.original_path_of(trash_id).await,
            kind: if metadata.is_dir() { "directory" } else { "file" },
            deleted_date: DateTime::<Local>::from(modified).to_rfc3339(),
            size_bytes: metadata.len(),
        };
        match serde_json::to_string_pretty(&info) {
            Ok(text) => ToolResult::text(text),
            Err(e) => ToolResult::error(format!("Error: {e}")),
        }
    }

    /// Build the deletion-guidance message. This never runs the external
    /// tool and never mutates anything; the ritual it describes happens
    /// in the user's own shell.
    pub fn request_delete(&self, path: &str) -> ToolResult {
        let absolute = expand_path(path);
        ToolResult::text(format!(
            r#"⚠️ DELETION REQUEST

To delete: {path}

I cannot delete files directly. Please run:

```bash
rm -rf "{path}"
```

You will need to:
1. Type the full path to confirm
2. Solve a math problem (e.g., 3847291 + 5192847 = ?)
3. Type 'DELETE'

Item moves to trash for 7 days. Restore with:
```bash
rm --list-trash
rm --restore <trash_id>
```"#,
            path = absolute.display()
        ))
    }

    /// Second pipe-delimited field of the first log line ending in
    /// `|<trash_id>`, or "Unknown".
    async fn original_path_of(&self, trash_id: &str) -> String {
        let log = self.config.trash_dir.join(DELETION_LOG);
        let contents = match tokio::fs::read_to_string(&log).await {
            Ok(contents) => contents,
            Err(_) => return "Unknown".to_string(),
        };
        let marker = format!("|{trash_id}");
        contents
            .lines()
            .find(|line| line.ends_with(&marker))
            .and_then(|line| line.split('|').nth(1))
            .unwrap_or("Unknown")
            .to_string()
    }

    /// Run safe-rm with an argument vector. The result is whichever of
    /// stdout or stderr is non-empty; spawn failures and timeouts
    /// degrade to `Error: ...` text instead of escaping.
    async fn exec(&self, args: &[&str]) -> String {
        let mut command = Command::new(&self.config.safe_rm_path);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => return format!("Error: {e}"),
        };

        match timeout(self.config.exec_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                if stdout.is_empty() {
                    String::from_utf8_lossy(&output.stderr).into_owned()
                } else {
                    stdout.into_owned()
                }
            }
            Ok(Err(e)) => format!("Error: {e}"),
            Err(_) => "Error: Command timed out".to_string(),
        }
    }
}

/// Expand a leading `~` and resolve relative paths against the working
/// directory.
fn expand_path(raw: &str) -> PathBuf {
    let expanded = if raw == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(raw))
    } else if let Some(tail) = raw.strip_prefix("~/") {
        match dirs::home_dir() {
            Some(home) => home.join(tail),
            None => PathBuf::from(raw),
        }
    } else {
        PathBuf::from(raw)
    };

    if expanded.is_absolute() {
        expanded
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(expanded),
            Err(_) => expanded,
        }
    }
}
