//! Lint command implementation

use std::io;

use miette::{IntoDiagnostic, Result};
use protolint_core::{Linter, LinterConfig, ProcessInvoker, RunOutcome};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::output::CodeClimateWriter;

pub fn run_lint(cli: &Cli) -> Result<()> {
    let config = LinterConfig::from_file(&cli.config, &cli.workspace).into_diagnostic()?;
    if let Some(source) = config.source() {
        debug!("Loaded config from {}", source.display());
    }
    debug!(
        "Config keys: {}",
        config.config_items().collect::<Vec<_>>().join(", ")
    );

    let linter = Linter::new(config).with_compiler(&cli.protoc);
    let mut writer = CodeClimateWriter::new(io::stdout().lock());
    let outcome = linter.run(&ProcessInvoker, &mut writer).into_diagnostic()?;
    let written = writer.written();
    writer.finish().into_diagnostic()?;

    match outcome {
        RunOutcome::NoFiles => {}
        RunOutcome::Completed(summary) => {
            debug!(
                "Linted {} files: {} classified, {} written, {} suppressed",
                summary.files, summary.classified, written, summary.suppressed
            );
            info!("All done.");
        }
    }

    Ok(())
}
