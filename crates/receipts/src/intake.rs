use std::path::{Path, PathBuf};

/// Extensions treated as receipt photos, compared case-insensitively.
pub const IMPORTABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub fn is_importable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| IMPORTABLE_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
        .unwrap_or(false)
}

/// Receipt photos directly inside `folder`, sorted by file name.
///
/// A missing or unreadable folder yields an empty list.
pub fn list_importable(folder: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Nothing to import from {}: {e}", folder.display());
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        // Follows symlinks, unlike `DirEntry::file_type`.
        .filter(|path| path.is_file() && is_importable(path))
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}
