//! Navigation operations implementation
//!
//! Working directories are real paths kept inside the session root; the
//! process working directory is never changed.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::NavigateError;
use crate::navigate::validation::PathClass;

/// Joins a client path onto the session, treating `/` as the session root.
fn join_client_path(root: &Path, cwd: &Path, target: &str) -> PathBuf {
    if target.starts_with('/') {
        root.join(target.trim_start_matches('/'))
    } else {
        cwd.join(target)
    }
}

/// Resolves the CWD target and returns the new working directory.
pub fn change_directory(root: &Path, cwd: &Path, target: &str) -> Result<PathBuf, NavigateError> {
    if target.is_empty() {
        return Err(NavigateError::InvalidPath("Empty path provided".into()));
    }

    if PathClass::classify(target).is_traversal() {
        return Err(NavigateError::PathTraversal(target.into()));
    }

    let candidate = join_client_path(root, cwd, target);
    let canonical = candidate
        .canonicalize()
        .map_err(|_| NavigateError::DirectoryNotFound(target.into()))?;

    // Symlinks may still point outside the root.
    if !canonical.starts_with(root) {
        return Err(NavigateError::PathTraversal(target.into()));
    }

    if !canonical.is_dir() {
        return Err(NavigateError::NotADirectory(target.into()));
    }

    Ok(canonical)
}

/// Returns the parent of `cwd`, refusing to leave the session root.
pub fn parent_directory(root: &Path, cwd: &Path) -> Result<PathBuf, NavigateError> {
    if cwd == root {
        return Err(NavigateError::AtRoot);
    }

    let parent = cwd
        .parent()
        .filter(|parent| parent.starts_with(root))
        .ok_or(NavigateError::AtRoot)?;

    match std::fs::metadata(parent) {
        Ok(metadata) if metadata.is_dir() => Ok(parent.to_path_buf()),
        Ok(_) => Err(NavigateError::ChangeFailed {
            path: parent.display().to_string(),
            source: io::Error::other("not a directory"),
        }),
        Err(source) => Err(NavigateError::ChangeFailed {
            path: parent.display().to_string(),
            source,
        }),
    }
}

/// Resolves a RETR file name. Names with `..` segments or resolving outside
/// the root are refused with `PermissionDenied`.
pub fn resolve_file(root: &Path, cwd: &Path, name: &str) -> io::Result<PathBuf> {
    if name.is_empty() || name.split('/').any(|segment| segment == "..") {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("refusing path {name:?}"),
        ));
    }

    let canonical = join_client_path(root, cwd, name).canonicalize()?;
    if !canonical.starts_with(root) {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("{name:?} resolves outside the server root"),
        ));
    }
    Ok(canonical)
}

/// Renders `cwd` as the client sees it, with the session root as `/`.
pub fn virtual_path(root: &Path, cwd: &Path) -> String {
    match cwd.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => "/".to_string(),
        Ok(relative) => format!("/{}", relative.display()),
        Err(_) => cwd.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("pub/nested")).unwrap();
        std::fs::write(root.join("pub/readme.txt"), b"hi").unwrap();
        (dir, root)
    }

    #[test]
    fn test_change_into_subdirectory() {
        let (_dir, root) = setup();
        let cwd = change_directory(&root, &root, "pub").unwrap();
        assert_eq!(cwd, root.join("pub"));

        let nested = change_directory(&root, &cwd, "nested").unwrap();
        assert_eq!(nested, root.join("pub/nested"));
    }

    #[test]
    fn test_absolute_path_is_rooted() {
        let (_dir, root) = setup();
        let cwd = root.join("pub/nested");
        assert_eq!(change_directory(&root, &cwd, "/pub").unwrap(), root.join("pub"));
        assert_eq!(change_directory(&root, &cwd, "/").unwrap(), root);
    }

    #[test]
    fn test_traversal_is_rejected() {
        let (_dir, root) = setup();
        let cwd = root.join("pub");
        for target in ["..", ".", "../pub", "nested/../..", ".hidden"] {
            assert!(
                matches!(
                    change_directory(&root, &cwd, target),
                    Err(NavigateError::PathTraversal(_))
                ),
                "{target}"
            );
        }
    }

    #[test]
    fn test_missing_and_non_directory_targets() {
        let (_dir, root) = setup();
        assert!(matches!(
            change_directory(&root, &root, "nope"),
            Err(NavigateError::DirectoryNotFound(_))
        ));
        assert!(matches!(
            change_directory(&root, &root, "pub/readme.txt"),
            Err(NavigateError::NotADirectory(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_rejected() {
        let (_dir, root) = setup();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("escape")).unwrap();
        assert!(matches!(
            change_directory(&root, &root, "escape"),
            Err(NavigateError::PathTraversal(_))
        ));
    }

    #[test]
    fn test_parent_directory_stops_at_root() {
        let (_dir, root) = setup();
        assert!(matches!(
            parent_directory(&root, &root),
            Err(NavigateError::AtRoot)
        ));
        let nested = root.join("pub/nested");
        assert_eq!(parent_directory(&root, &nested).unwrap(), root.join("pub"));
        assert_eq!(parent_directory(&root, &root.join("pub")).unwrap(), root);
    }

    #[test]
    fn test_parent_directory_removed_underneath() {
        let (_dir, root) = setup();
        let nested = root.join("pub/nested");
        std::fs::remove_dir_all(root.join("pub")).unwrap();
        assert!(matches!(
            parent_directory(&root, &nested),
            Err(NavigateError::ChangeFailed { .. })
        ));
    }

    #[test]
    fn test_resolve_file() {
        let (_dir, root) = setup();
        let cwd = root.join("pub");
        assert_eq!(
            resolve_file(&root, &cwd, "readme.txt").unwrap(),
            root.join("pub/readme.txt")
        );
        assert_eq!(
            resolve_file(&root, &root.join("pub/nested"), "/pub/readme.txt").unwrap(),
            root.join("pub/readme.txt")
        );
        assert_eq!(
            resolve_file(&root, &cwd, "../pub/readme.txt").unwrap_err().kind(),
            io::ErrorKind::PermissionDenied
        );
        assert_eq!(
            resolve_file(&root, &cwd, "missing.txt").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_virtual_path_hides_root() {
        let root = PathBuf::from("/srv/ftp");
        assert_eq!(virtual_path(&root, &root), "/");
        assert_eq!(virtual_path(&root, &root.join("pub/nested")), "/pub/nested");
    }
}
