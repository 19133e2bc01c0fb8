//! Recursive file discovery by extension.
//!
//! Equivalent to globbing `<root>/**/*.<ext>`: the root itself and every
//! subdirectory are searched, symlinked directories are not descended into,
//! and results come back sorted so repeated runs invoke tools in the same
//! order.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// Qt resource definitions
pub const QRC_EXTENSION: &str = "qrc";
/// Qt Designer forms
pub const UI_EXTENSION: &str = "ui";
/// Python sources scanned for translatable strings
pub const PY_EXTENSION: &str = "py";
/// Qt translation catalogs
pub const TS_EXTENSION: &str = "ts";

/// Find every file below `root` whose extension is exactly `extension`.
///
/// The match is case-sensitive. Paths that are not valid UTF-8 are skipped
/// with a warning.
pub fn find_files(root: &Utf8Path, extension: &str) -> Result<Vec<Utf8PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = dir
            .as_std_path()
            .read_dir()
            .with_context(|| format!("Failed to read directory: {}", dir))?;

        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to read directory: {}", dir))?;
            let path = match Utf8PathBuf::from_path_buf(entry.path()) {
                Ok(path) => path,
                Err(path) => {
                    tracing::warn!("Skipping non UTF-8 path: {}", path.display());
                    continue;
                }
            };

            let file_type = entry
                .file_type()
                .with_context(|| format!("Failed to inspect: {}", path))?;

            if file_type.is_dir() {
                pending.push(path);
            } else if path.extension() == Some(extension) && path.is_file() {
                found.push(path);
            }
        }
    }

    found.sort();
    tracing::debug!(
        "Found {} *.{} files under {}",
        found.len(),
        extension,
        root
    );

    Ok(found)
}
