//! Include path resolution and schema file discovery.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{LinterConfig, LinterError};

/// Extension of the schema files handed to the compiler.
pub const PROTO_EXTENSION: &str = "proto";

/// Include directories and schema files discovered for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Absolute workspace root.
    pub workspace_root: PathBuf,
    /// Absolute include directories, in configuration order.
    pub include_dirs: Vec<PathBuf>,
    /// Absolute schema files, in encounter order.
    pub files: Vec<PathBuf>,
}

impl ResolvedPaths {
    /// Returns `true` when there is nothing to lint.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Finds the discovered file that `reported` refers to.
    ///
    /// The compiler reports files relative to a search path, so the match is
    /// made on trailing path components. The first discovered match wins.
    pub fn find(&self, reported: &str) -> Option<&Path> {
        let reported = Path::new(reported);
        self.files
            .iter()
            .find(|path| path.ends_with(reported))
            .map(PathBuf::as_path)
    }
}

/// Resolves configured include paths against the workspace.
///
/// Compiled exclude expressions are cached for the lifetime of the resolver,
/// which is one run.
pub struct PathResolver<'a> {
    config: &'a LinterConfig,
    regexes: HashMap<String, Option<Regex>>,
}

impl<'a> PathResolver<'a> {
    pub fn new(config: &'a LinterConfig) -> Self {
        Self {
            config,
            regexes: HashMap::new(),
        }
    }

    /// Returns the absolute workspace root.
    ///
    /// Resolving an absolute path returns it unchanged.
    pub fn workspace_root(&self) -> Result<PathBuf, LinterError> {
        let workspace = self.config.workspace();
        if workspace.is_absolute() {
            return Ok(workspace.to_path_buf());
        }
        Ok(std::path::absolute(workspace)?)
    }

    /// Makes a configured path absolute, relative to the workspace root.
    pub fn make_absolute(&self, path: &str) -> Result<PathBuf, LinterError> {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            return Ok(candidate.to_path_buf());
        }
        Ok(self.workspace_root()?.join(candidate))
    }

    /// Returns `true` when a configured include path should be skipped.
    pub fn is_excluded(&mut self, candidate: &str) -> bool {
        let config = self.config;
        let excludes = config.exclude_paths();
        if excludes.iter().any(|exclude| exclude == candidate) {
            return true;
        }
        excludes
            .iter()
            .any(|exclude| self.exclude_match(candidate, exclude))
    }

    fn exclude_match(&mut self, path: &str, exclude: &str) -> bool {
        if path.starts_with(exclude) {
            return true;
        }

        let Some(regex) = self.compile_regex(exclude) else {
            return false;
        };
        // anchored at the start of the candidate, like a prefix
        if regex.find(path).is_some_and(|m| m.start() == 0) {
            debug!("Path '{}' excluded by exclusion path '{}'.", path, exclude);
            return true;
        }
        false
    }

    fn compile_regex(&mut self, formula: &str) -> Option<&Regex> {
        self.regexes
            .entry(formula.to_string())
            .or_insert_with(|| match Regex::new(formula) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!(
                        "Unable to compile exclude_path as regex: '{}': {}",
                        formula, e
                    );
                    None
                }
            })
            .as_ref()
    }

    /// Resolves include directories and discovers schema files beneath them.
    pub fn resolve(&mut self) -> Result<ResolvedPaths, LinterError> {
        let workspace_root = self.workspace_root()?;
        let mut include_dirs = Vec::new();
        let mut files = Vec::new();

        let config = self.config;
        for configured_path in config.include_paths() {
            if self.is_excluded(configured_path) {
                debug!("Skipping excluded path \"{}\".", configured_path);
                continue;
            }

            let include_dir = self.make_absolute(configured_path)?;
            if !include_dir.is_dir() {
                debug!("Skipping non-directory path \"{}\".", include_dir.display());
                continue;
            }

            debug!("Scanning include_path \"{}\"...", include_dir.display());
            let batch = scan(&include_dir);
            if batch.is_empty() {
                debug!("Found no protos.");
            } else {
                debug!("Found {} protos:", batch.len());
                for file in &batch {
                    debug!("- {}", file.display());
                }
            }

            include_dirs.push(include_dir);
            files.extend(batch);
        }

        info!("Discovered {} protos to lint", files.len());
        Ok(ResolvedPaths {
            workspace_root,
            include_dirs,
            files,
        })
    }
}

/// Recursively collects schema files under `dir`.
fn scan(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == PROTO_EXTENSION))
        .collect()
}
