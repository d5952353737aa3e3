//! Rule applicator - runs a rule file against values documents
//!
//! Rules are applied in file order, each one to the output of the previous
//! rule. A file is only rewritten when the final bytes differ from what is on
//! disk, and the write goes through a temporary file in the same directory so
//! a crash never leaves a half-written values file behind.

use crate::config::schema::RuleSet;
use crate::update::UpdateError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of applying a rule set to one file
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "FileOutcome should be checked to report what changed"]
pub enum FileOutcome {
    /// At least one byte changed (written back unless this was a dry run)
    Changed {
        file: PathBuf,
        before: Vec<u8>,
        after: Vec<u8>,
    },
    /// The rules produced the same bytes that were already on disk
    Unchanged { file: PathBuf },
}

impl FileOutcome {
    pub fn file(&self) -> &Path {
        match self {
            FileOutcome::Changed { file, .. } | FileOutcome::Unchanged { file } => file,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, FileOutcome::Changed { .. })
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Changed { file, .. } => write!(f, "Updated {}", file.display()),
            FileOutcome::Unchanged { file } => write!(f, "No changes in {}", file.display()),
        }
    }
}

/// Errors during rule application
#[derive(Debug)]
pub enum ApplicationError {
    /// A rule failed; nothing after it was applied
    Rule { id: String, source: UpdateError },
    /// File I/O error
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationError::Rule { id, source } => write!(f, "rule '{}' failed: {}", id, source),
            ApplicationError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ApplicationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplicationError::Rule { source, .. } => Some(source),
            ApplicationError::Io { source, .. } => Some(source),
        }
    }
}

/// Apply every rule of `rules` to `document`, in order.
pub fn apply_rules(rules: &RuleSet, document: &[u8]) -> Result<Vec<u8>, ApplicationError> {
    let mut current = document.to_vec();
    for definition in &rules.rules {
        let next = definition
            .rule
            .apply(&current)
            .map_err(|source| ApplicationError::Rule {
                id: definition.id.clone(),
                source,
            })?;
        debug!(
            rule = %definition.id,
            changed = next != current,
            "applied rule"
        );
        current = next;
    }
    Ok(current)
}

/// Apply `rules` to the file at `path`, writing the result back unless
/// `dry_run` is set.
pub fn apply_to_file(
    rules: &RuleSet,
    path: impl AsRef<Path>,
    dry_run: bool,
) -> Result<FileOutcome, ApplicationError> {
    let path = path.as_ref();
    let io_error = |source| ApplicationError::Io {
        path: path.to_path_buf(),
        source,
    };

    let before = fs::read(path).map_err(io_error)?;
    let after = apply_rules(rules, &before)?;

    if after == before {
        debug!(file = %path.display(), "rules produced no changes");
        return Ok(FileOutcome::Unchanged {
            file: path.to_path_buf(),
        });
    }

    if dry_run {
        info!(file = %path.display(), "dry run, not writing changes");
    } else {
        atomic_write(path, &after).map_err(io_error)?;
        info!(file = %path.display(), bytes = after.len(), "wrote updated values");
    }

    Ok(FileOutcome::Changed {
        file: path.to_path_buf(),
        before,
        after,
    })
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Same directory keeps the rename on one filesystem
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
