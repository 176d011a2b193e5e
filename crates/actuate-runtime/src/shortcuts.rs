//! macOS Shortcuts backend, driven through the `shortcuts` command line tool.

use crate::invoker::{
    AutomationInvoker, IndexProvider, InvocationRequest, InvokeError, OutputArtifact,
};
use actuate_core::{AutomationIndex, AutomationRecord};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Location of the system `shortcuts` binary.
pub const SHORTCUTS_BIN: &str = "/usr/bin/shortcuts";

static LIST_LINE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(.*) \(([0-9A-Fa-f-]+)\)$").ok());

/// Invoker and index provider backed by `shortcuts run` / `shortcuts list`.
#[derive(Debug, Clone)]
pub struct ShortcutsCli {
    program: PathBuf,
}

impl Default for ShortcutsCli {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutsCli {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(SHORTCUTS_BIN),
        }
    }

    /// Use a different binary, e.g. a stub script in tests.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.kill_on_drop(true).stdin(Stdio::null());
        command
    }

    fn spawn_error(&self, source: std::io::Error) -> InvokeError {
        InvokeError::Spawn {
            program: self.program.display().to_string(),
            source,
        }
    }
}

/// Parse `shortcuts list --show-identifiers` output.
///
/// Lines look like `Name (UUID)`; lines without an identifier become
/// name-only records.
pub fn parse_list(output: &str) -> AutomationIndex {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match LIST_LINE.as_ref().and_then(|re| re.captures(line)) {
            Some(caps) => AutomationRecord::with_id(&caps[1], &caps[2]),
            None => AutomationRecord::named(line),
        })
        .collect()
}

/// Collect visible files of an output directory as artifacts.
async fn read_artifacts(dir: &Path) -> Result<Vec<OutputArtifact>, InvokeError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut artifacts = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let bytes = tokio::fs::read(entry.path()).await?;
        artifacts.push(OutputArtifact { name, bytes });
    }
    Ok(artifacts)
}

#[async_trait]
impl IndexProvider for ShortcutsCli {
    async fn list(&self) -> Result<AutomationIndex, InvokeError> {
        let output = self
            .command()
            .args(["list", "--show-identifiers"])
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(InvokeError::failed(
                "list",
                output.status.to_string(),
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        let index = parse_list(&String::from_utf8_lossy(&output.stdout));
        debug!(count = index.len(), "Listed installed shortcuts");
        Ok(index)
    }
}

#[async_trait]
impl AutomationInvoker for ShortcutsCli {
    async fn invoke(
        &self,
        request: &InvocationRequest,
    ) -> Result<Vec<OutputArtifact>, InvokeError> {
        let mut input = tempfile::Builder::new()
            .prefix("actuate-input-")
            .suffix(".json")
            .tempfile()?;
        input.write_all(&request.payload)?;
        input.flush()?;

        let output_dir = tempfile::Builder::new().prefix("actuate-output-").tempdir()?;

        let mut command = self.command();
        command
            .arg("run")
            .arg(&request.automation)
            .arg("--input-path")
            .arg(input.path())
            .arg("--output-path")
            .arg(output_dir.path());
        if let Some(output_type) = request.output_type.as_deref() {
            command.args(["--output-type", output_type]);
        }

        debug!(automation = %request.automation, "Running shortcut");
        let output = command
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(InvokeError::failed(
                request.automation.as_str(),
                output.status.to_string(),
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        read_artifacts(output_dir.path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listing_with_and_without_ids() {
        let index = parse_list(
            "All Tasks (8F2C11AA-0B1C-4D2E-9F00-123456789ABC)\n\n  Plain Name  \nOdd (name) here\n",
        );
        let records: Vec<&AutomationRecord> = index.iter().collect();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "All Tasks");
        assert_eq!(
            records[0].id.as_deref(),
            Some("8F2C11AA-0B1C-4D2E-9F00-123456789ABC")
        );
        assert_eq!(records[1], &AutomationRecord::named("Plain Name"));
        assert_eq!(records[2], &AutomationRecord::named("Odd (name) here"));
    }

    #[tokio::test]
    async fn output_directory_skips_hidden_files_and_dirs() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("b.txt"), "hi").expect("write");
        std::fs::write(dir.path().join("a.json"), "{}").expect("write");
        std::fs::write(dir.path().join(".DS_Store"), "x").expect("write");
        std::fs::create_dir(dir.path().join("nested")).expect("mkdir");

        let mut artifacts = read_artifacts(dir.path()).await.expect("read");
        artifacts.sort_by(|a, b| a.name.cmp(&b.name));
        let names: Vec<&str> = artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a.json", "b.txt"]);
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let cli = ShortcutsCli::with_program("/nonexistent/shortcuts");
        let error = cli.list().await.unwrap_err();
        assert!(matches!(error, InvokeError::Spawn { .. }));
        assert!(!error.is_target_not_found());
    }
}
