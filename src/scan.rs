//! Directory scanning for slide images.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::error::Error;

const SLIDE_EXTS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Return `true` if `path` has an extension the slides can display.
#[must_use]
pub fn is_slide_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            SLIDE_EXTS.iter().any(|e| *e == ext)
        })
}

/// Recursively collect slide images below `root`, sorted by path so the
/// rotation order is stable between runs.
///
/// # Errors
/// Returns [`Error::BadDir`] if `root` is missing or not a directory, and
/// [`Error::Io`] if it cannot be listed. Unreadable entries below the root
/// are skipped.
pub fn discover_slides(root: &Path) -> Result<Vec<PathBuf>, Error> {
    if !root.is_dir() {
        return Err(Error::BadDir(root.to_string_lossy().into_owned()));
    }

    let mut out = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !should_skip_dir(e));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(Error::Io(err.into())),
            Err(err) => {
                warn!("skipping unreadable entry under {}: {err}", root.display());
                continue;
            }
        };
        if entry.file_type().is_file() && is_slide_image(entry.path()) {
            out.push(entry.into_path());
        }
    }
    out.sort();
    Ok(out)
}

fn should_skip_dir(entry: &DirEntry) -> bool {
    // Never skip the root; tempfile roots can be dot-dirs.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|n| n.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_root_is_bad_dir() {
        let tmp = tempdir().unwrap();
        let err = discover_slides(&tmp.path().join("absent")).unwrap_err();
        assert!(matches!(err, Error::BadDir(_)));
    }

    #[cfg(unix)]
    #[test]
    fn broken_links_below_root_are_skipped() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("a.jpg"), b"x").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("b.jpg")).unwrap();

        let found = discover_slides(tmp.path()).unwrap();
        assert_eq!(found, vec![tmp.path().join("a.jpg")]);
    }
}
