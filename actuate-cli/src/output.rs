//! Writing results to stdout in human or JSON form.

use crate::error::{CliError, CliResult};
use actuate_runtime::ErrorEnvelope;
use serde::Serialize;
use std::io::Write;

/// Output policy chosen by global flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputMode {
    pub json: bool,
    pub pretty: bool,
}

impl OutputMode {
    pub fn new(json: bool, pretty: bool) -> Self {
        Self { json, pretty }
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> CliResult<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> CliResult<()> {
        let text = self.encode(value)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}")?;
        Ok(())
    }

    /// Raw bytes, untouched.
    pub fn print_raw(&self, bytes: &[u8]) -> CliResult<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_line(&self, line: impl std::fmt::Display) -> CliResult<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{line}")?;
        Ok(())
    }

    /// Report a terminal error: JSON on stdout in JSON mode, text on stderr otherwise.
    pub fn report_error(&self, error: &CliError) {
        if self.json {
            let envelope = ErrorEnvelope::new(error.code(), error.to_string());
            if self.print_json(&envelope).is_ok() {
                return;
            }
        }
        eprintln!("error: {error}");
    }
}
