//! Shared filesystem helpers.

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

/// Error from a filesystem helper, carrying the path that failed.
#[derive(thiserror::Error, Debug)]
pub enum FsError {
    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl FsError {
    pub fn io<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(std::io::Error) -> Self + 'a {
        move |source| FsError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Create a directory and its parents.
pub fn create_dir_all(path: &Path) -> Result<(), FsError> {
    std::fs::create_dir_all(path).map_err(FsError::io("failed to create", path))
}

/// Remove a directory tree if it exists, then create it empty.
pub fn recreate_dir(path: &Path) -> Result<(), FsError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(FsError::io("failed to remove", path))?;
    }
    create_dir_all(path)
}

/// Copy a single file, creating the destination's parent directory.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), FsError> {
    if let Some(parent) = to.parent() {
        create_dir_all(parent)?;
    }
    std::fs::copy(from, to).map_err(FsError::io("failed to copy", from))?;
    Ok(())
}

/// Recursively copy `src` into `dst`, merging with anything already there.
///
/// Returns the number of files copied.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<usize, FsError> {
    let mut copied = 0;
    create_dir_all(dst)?;

    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| FsError::Walk {
            path: src.to_path_buf(),
            source,
        })?;
        // min_depth(1) guarantees the entry lives under src
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Direct children of `dir`, sorted by name, skipping hidden entries.
pub fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, FsError> {
    let read = std::fs::read_dir(dir).map_err(FsError::io("failed to read", dir))?;

    let mut entries = Vec::new();
    for entry in read {
        let entry = entry.map_err(FsError::io("failed to read", dir))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// All files under `root` with the given extension, sorted by path.
pub fn files_with_extension(root: &Path, extension: &str) -> Result<Vec<PathBuf>, FsError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| FsError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent.
///
/// Does not touch the filesystem, so symlinks are not resolved. A leading
/// `..` that has nothing to fold into is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let folds = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if folds {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Whether `a` and `b` are the same directory or one contains the other,
/// comparing normalized paths.
pub fn paths_overlap(a: &Path, b: &Path) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    a.starts_with(&b) || b.starts_with(&a)
}

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Base name of a file without its extension.
pub fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}
