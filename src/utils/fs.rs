//! Directory walking and copying for the asset and data trees.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::{DirEntry, WalkDir};

/// Files to ignore during directory traversal
pub const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Collect all files from a directory recursively, skipping excluded directories.
///
/// `exclude` matches directory names at any depth. The root itself is never
/// excluded.
pub fn collect_all_files(dir: &Path, exclude: &[String]) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded_dir(e, exclude))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.into_path())
        .collect()
}

fn is_excluded_dir(entry: &DirEntry, exclude: &[String]) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| exclude.iter().any(|ex| ex == name))
}

/// Copy every file under `src` into `dst`, preserving relative paths.
///
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path, exclude: &[String]) -> Result<usize> {
    let files = collect_all_files(src, exclude);

    files.par_iter().try_for_each(|path| -> Result<()> {
        let rel = path.strip_prefix(src)?;
        let dest = dst.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::copy(path, &dest)
            .with_context(|| format!("Failed to copy {} to {}", path.display(), dest.display()))?;
        Ok(())
    })?;

    Ok(files.len())
}

/// Write a file, creating parent directories as needed.
pub fn write_file(path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Total size in bytes of all regular files under `dir`.
pub fn dir_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Human-readable size, e.g. `12.34 MB`.
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.2} {}", UNITS[unit])
    }
}
