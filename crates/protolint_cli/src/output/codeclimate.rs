//! CodeClimate issue stream writer
//!
//! Each issue is one JSON document followed by a NUL byte and a newline.

use std::io::{self, Write};

use protolint_core::{ExternalIssue, IssueRecord, IssueSink, LinterError, Severity};
use tracing::{error, warn};

const TERMINATOR: &[u8] = b"\0\n";

pub struct CodeClimateWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> CodeClimateWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Number of issues written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> IssueSink for CodeClimateWriter<W> {
    fn emit(&mut self, record: &IssueRecord, issue: &ExternalIssue<'_>) -> Result<(), LinterError> {
        log_issue(record);

        serde_json::to_writer(&mut self.out, issue).map_err(io::Error::from)?;
        self.out.write_all(TERMINATOR)?;
        self.written += 1;
        Ok(())
    }
}

fn log_issue(record: &IssueRecord) {
    match record.severity() {
        Severity::Minor => warn!("[{}]: {}", record.kind(), record.message()),
        Severity::Major | Severity::Critical => {
            error!("[{}]: {}", record.kind(), record.message())
        }
    }
}
