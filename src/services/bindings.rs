//! Rewriting of Qt binding imports in generated UI modules.
//!
//! pyuic writes `from PyQt5 import QtCore, QtGui, QtWidgets`. Projects that go
//! through a wrapper such as Qt.py or QtPy need that line to name the wrapper
//! instead, so after a successful compilation the generated module is rewritten
//! in place.

use crate::models::BuildSettings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use regex::{NoExpand, Regex};
use std::borrow::Cow;
use std::fs::{self, File, FileTimes};
use std::io::Write;
use thiserror::Error;

/// Failures while replacing a file with its rewritten content
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("failed to write {path}, original restored")]
    Restored {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path} and to restore it, original kept at {backup}")]
    RestoreFailed {
        path: Utf8PathBuf,
        backup: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Replaces `from <binding> import` with `from <replacement> import` at the
/// start of every line.
#[derive(Debug, Clone)]
pub struct BindingRewriter {
    pattern: Regex,
    replacement: String,
}

impl BindingRewriter {
    pub fn new(binding: &str, replacement: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"(?m)^from {} import", regex::escape(binding)))?;
        Ok(Self {
            pattern,
            replacement: format!("from {} import", replacement),
        })
    }

    /// Rewriter for the configured bindings, `None` unless both the binding
    /// and its replacement are set
    pub fn from_settings(settings: &BuildSettings) -> Result<Option<Self>, regex::Error> {
        match (settings.binding(), settings.replacement_binding()) {
            (Some(binding), Some(replacement)) => {
                Self::new(binding.module_name(), replacement).map(Some)
            }
            _ => Ok(None),
        }
    }

    pub fn rewrite_text<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern
            .replace_all(text, NoExpand(&self.replacement))
    }

    /// Rewrite `path` in place.
    ///
    /// The original is moved to `<path>.bak` while the new content is written
    /// and restored if writing fails. Permissions and timestamps of the original
    /// carry over. Returns `false` (and leaves the file alone) when nothing
    /// matched.
    pub fn rewrite_file(&self, path: &Utf8Path) -> Result<bool> {
        let original = fs::read_to_string(path)
            .with_context(|| format!("Failed to read generated module: {}", path))?;

        let rewritten = match self.rewrite_text(&original) {
            Cow::Borrowed(_) => {
                tracing::debug!("No binding imports to rewrite in {}", path);
                return Ok(false);
            }
            Cow::Owned(text) => text,
        };

        let backup = backup_path(path);
        fs::rename(path, &backup)
            .with_context(|| format!("Failed to move {} to {}", path, backup))?;

        if let Err(source) = write_with_metadata(path, &backup, &rewritten) {
            let _ = fs::remove_file(path);
            return match fs::rename(&backup, path) {
                Ok(()) => Err(RewriteError::Restored {
                    path: path.to_path_buf(),
                    source,
                }
                .into()),
                Err(_) => Err(RewriteError::RestoreFailed {
                    path: path.to_path_buf(),
                    backup,
                    source,
                }
                .into()),
            };
        }

        fs::remove_file(&backup)
            .with_context(|| format!("Failed to remove backup: {}", backup))?;

        tracing::debug!("Rewrote binding imports in {}", path);
        Ok(true)
    }
}

fn backup_path(path: &Utf8Path) -> Utf8PathBuf {
    let file_name = path.file_name().unwrap_or_default();
    path.with_file_name(format!("{}.bak", file_name))
}

/// Write `content` to `path`, then copy timestamps and permissions from `source`
fn write_with_metadata(path: &Utf8Path, source: &Utf8Path, content: &str) -> std::io::Result<()> {
    let metadata = fs::metadata(source)?;

    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;

    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    file.set_times(times)?;
    drop(file);

    fs::set_permissions(path, metadata.permissions())
}
