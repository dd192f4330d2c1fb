//! XDG application directory discovery.
//!
//! Enumerates absolute paths to candidate `.desktop` files by following
//! the platform's XDG application data-path order:
//! `$XDG_DATA_HOME/applications` then each `$XDG_DATA_DIRS/applications`.

use std::path::PathBuf;

use jwalk::WalkDir;

fn user_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// `$XDG_DATA_HOME`, defaulting to `~/.local/share`.
pub fn data_home() -> Option<PathBuf> {
    std::env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|| user_home().map(|h| h.join(".local").join("share")))
}

/// `$XDG_DATA_DIRS`, defaulting to `/usr/local/share:/usr/share`.
pub fn data_dirs() -> Vec<PathBuf> {
    match std::env::var_os("XDG_DATA_DIRS") {
        Some(dirs) => std::env::split_paths(&dirs).collect(),
        None => vec!["/usr/local/share".into(), "/usr/share".into()],
    }
}

/// The full, ordered list of `applications` directories to search:
/// `$XDG_DATA_HOME/applications` first, then each `$XDG_DATA_DIRS`
/// member's `applications` subdirectory.
pub fn application_directories() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(home) = data_home() {
        dirs.push(home.join("applications"));
    }
    dirs.extend(data_dirs().into_iter().map(|d| d.join("applications")));
    dirs
}

/// Enumerate every top-level entry of every application directory, in
/// enumeration order. Does not recurse (depth 1 only) and does not filter
/// by extension — filtering `.desktop` files out of whatever else lives
/// there is the application index's job. A directory that doesn't exist
/// or can't be read is silently skipped, along with any single entry
/// jwalk fails to stat.
pub fn candidate_desktop_file_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for dir in application_directories() {
        if !dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&dir).max_depth(1).into_iter().flatten() {
            let path = entry.path();
            if path == dir {
                continue;
            }
            if entry.file_type().is_file() {
                paths.push(path);
            }
        }
    }
    paths
}
