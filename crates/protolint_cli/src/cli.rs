//! CLI argument definitions

use std::path::PathBuf;

use clap::Parser;
use protolint_core::DEFAULT_COMPILER;

/// protolint - Lint Protobuf models, enums and services
#[derive(Parser)]
#[command(name = "protolint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file for CodeClimate linting
    pub config: PathBuf,

    /// Path to the workspace presumably full of protos
    pub workspace: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Protobuf compiler to run (must have protoc-gen-lint on its PATH)
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_COMPILER)]
    pub protoc: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["protolint", "/config.json", "/code"]);

        assert_eq!(cli.config, PathBuf::from("/config.json"));
        assert_eq!(cli.workspace, PathBuf::from("/code"));
        assert!(!cli.verbose);
        assert_eq!(cli.protoc, "protoc");
    }

    #[test]
    fn test_options() {
        let cli = Cli::parse_from([
            "protolint",
            "-v",
            "--protoc",
            "/usr/local/bin/protoc",
            "config.json",
            ".",
        ]);

        assert!(cli.verbose);
        assert_eq!(cli.protoc, "/usr/local/bin/protoc");
    }

    #[test]
    fn test_positionals_are_required() {
        assert!(Cli::try_parse_from(["protolint", "/config.json"]).is_err());
    }
}
