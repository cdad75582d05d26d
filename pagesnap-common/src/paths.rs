//! Home-directory expansion for user supplied paths.

use std::path::{Path, PathBuf};

/// Expand a leading `~` to the current user's home directory.
///
/// Paths without the shorthand, and paths that are not valid UTF-8, are
/// returned unchanged.
///
/// ```
/// use pagesnap_common::paths::expand_home;
/// use std::path::Path;
///
/// assert_eq!(expand_home(Path::new("log/out.txt")), Path::new("log/out.txt"));
/// ```
pub fn expand_home(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) if raw.starts_with('~') => PathBuf::from(shellexpand::tilde(raw).into_owned()),
        _ => path.to_path_buf(),
    }
}
