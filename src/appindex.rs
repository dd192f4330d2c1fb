//! The in-memory application index: load, parse, and incrementally
//! refresh `.desktop` files into `AppRecord`s.
//!
//! `Index::refresh(force = false)` is a deliberately limited incremental
//! path: it appends newly-modified entries without removing the prior
//! version of a changed file or evicting records for files that have
//! disappeared. A full `refresh(force = true)` always yields a correct,
//! current index.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use rayon::prelude::*;

use crate::util::which;
use crate::xdg::candidate_desktop_file_paths;

/// One valid, loaded `.desktop` entry.
///
/// Invariants (checked once, at load time, by `parse_desktop_file`): the
/// backing file was a regular file with a `.desktop` extension, parsed
/// without fatal errors, declared `Type=Application`, was not `Hidden`,
/// was not categorized `Screensaver`, either had no `TryExec` or one that
/// resolved on `PATH`, and had a non-empty `Exec`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppRecord {
    pub name: String,
    pub exec: String,
    pub comment: String,
    pub generic_name: String,
    pub icon: String,
    /// The backing file path, retained so incremental refresh can compare
    /// against a fresh scan.
    path: PathBuf,
}

impl AppRecord {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn exec(&self) -> &str {
        &self.exec
    }
    pub fn comment(&self) -> &str {
        &self.comment
    }
    pub fn generic_name(&self) -> &str {
        &self.generic_name
    }
    pub fn icon(&self) -> &str {
        &self.icon
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse the `[Desktop Entry]` group of the file at `path` into an
/// `AppRecord`, or `None` if it fails any validity check (parse failure,
/// duplicate-key-ish oddities, wrong type, hidden, screensaver, dangling
/// `TryExec`, or empty `Exec`). Every rejection is swallowed by design —
/// callers never see why a particular file was excluded.
fn parse_desktop_file(path: &Path) -> Option<AppRecord> {
    if path.extension().and_then(|e| e.to_str()) != Some("desktop") {
        return None;
    }
    let content = fs::read_to_string(path).ok()?;

    let mut name: Option<String> = None;
    let mut exec: Option<String> = None;
    let mut comment = String::new();
    let mut generic_name = String::new();
    let mut icon = String::new();
    let mut app_type = String::new();
    let mut categories: Vec<String> = Vec::new();
    let mut try_exec: Option<String> = None;
    let mut hidden = false;
    let mut in_desktop_entry = false;
    let mut seen_desktop_entry = false;

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            if line == "[Desktop Entry]" {
                if seen_desktop_entry {
                    // Duplicate group: treated as a parse failure, swallowed
                    // like any other malformed entry.
                    return None;
                }
                seen_desktop_entry = true;
                in_desktop_entry = true;
            } else {
                // Any other group ends the Desktop Entry section; the
                // rest of the file is irrelevant to us.
                if in_desktop_entry {
                    break;
                }
            }
            continue;
        }
        if !in_desktop_entry {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        match key {
            "Type" => app_type = value.to_string(),
            "Name" => {
                if name.is_none() {
                    name = Some(value.to_string());
                }
            }
            "Exec" => exec = Some(value.to_string()),
            "TryExec" => try_exec = Some(value.to_string()),
            "Comment" => {
                if comment.is_empty() {
                    comment = value.to_string();
                }
            }
            "GenericName" => {
                if generic_name.is_empty() {
                    generic_name = value.to_string();
                }
            }
            "Icon" => {
                if icon.is_empty() {
                    icon = value.to_string();
                }
            }
            "Categories" => {
                categories = value
                    .split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "Hidden" => hidden = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }

    if !seen_desktop_entry {
        return None;
    }
    if app_type != "Application" {
        return None;
    }
    if hidden {
        return None;
    }
    if categories.iter().any(|c| c == "Screensaver") {
        return None;
    }
    if let Some(try_exec) = &try_exec {
        if which(try_exec).is_none() {
            return None;
        }
    }
    let exec = exec.filter(|e| !e.is_empty())?;
    let name = name?;

    Some(AppRecord {
        name,
        exec,
        comment,
        generic_name,
        icon,
        path: path.to_path_buf(),
    })
}

/// The per-provider index: an ordered, discovery-order sequence of
/// `AppRecord`s plus the wall-clock time of the last successful full load
/// or partial refresh.
#[derive(Debug, Clone)]
pub struct Index {
    records: Vec<AppRecord>,
    last_refresh_time: SystemTime,
}

impl Index {
    /// Build a fresh index via a full load from the current filesystem
    /// state. Individual file failures are swallowed; directories that
    /// can't be enumerated are skipped (`xdg::candidate_desktop_file_paths`
    /// already does both).
    pub fn load() -> Self {
        let records = Self::scan(&candidate_desktop_file_paths());
        Self {
            records,
            last_refresh_time: SystemTime::now(),
        }
    }

    fn scan(paths: &[PathBuf]) -> Vec<AppRecord> {
        paths
            .par_iter()
            .filter_map(|p| parse_desktop_file(p))
            .collect()
    }

    pub fn records(&self) -> &[AppRecord] {
        &self.records
    }

    pub fn last_refresh_time(&self) -> SystemTime {
        self.last_refresh_time
    }

    /// Refresh this index.
    ///
    /// `force = true` discards and repeats a full load, equal to a fresh
    /// `Index::load()`.
    ///
    /// `force = false` is a deliberately limited incremental path: for
    /// each candidate path whose mtime is strictly newer than
    /// `last_refresh_time`, attempt to parse and *append* a new
    /// `AppRecord`. It does not remove the prior version of a modified
    /// file, nor does it evict records for files that have disappeared —
    /// a caller wanting a fully current index should use `force = true`.
    pub fn refresh(&mut self, force: bool) {
        if force {
            *self = Self::load();
            return;
        }

        let cutoff = self.last_refresh_time;
        for path in candidate_desktop_file_paths() {
            let Ok(metadata) = fs::metadata(&path) else {
                continue;
            };
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            if modified > cutoff {
                if let Some(record) = parse_desktop_file(&path) {
                    self.records.push(record);
                }
            }
        }
        self.last_refresh_time = SystemTime::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ENV_LOCK;
    use std::fs;

    fn write_entry(dir: &Path, filename: &str, body: &str) {
        fs::write(dir.join(filename), body).unwrap();
    }

    #[test]
    fn parses_a_minimal_valid_entry() {
        let tmp = tempfile::tempdir().unwrap();
        write_entry(
            tmp.path(),
            "app.desktop",
            "[Desktop Entry]\nType=Application\nName=Firefox\nExec=firefox %u\n",
        );
        let record = parse_desktop_file(&tmp.path().join("app.desktop")).unwrap();
        assert_eq!(record.name(), "Firefox");
        assert_eq!(record.exec(), "firefox %u");
    }

    #[test]
    fn rejects_non_application_type() {
        let tmp = tempfile::tempdir().unwrap();
        write_entry(
            tmp.path(),
            "link.desktop",
            "[Desktop Entry]\nType=Link\nName=Example\nURL=https://example.com\n",
        );
        assert!(parse_desktop_file(&tmp.path().join("link.desktop")).is_none());
    }

    #[test]
    fn rejects_hidden_entry() {
        let tmp = tempfile::tempdir().unwrap();
        write_entry(
            tmp.path(),
            "hidden.desktop",
            "[Desktop Entry]\nType=Application\nName=X\nExec=x\nHidden=true\n",
        );
        assert!(parse_desktop_file(&tmp.path().join("hidden.desktop")).is_none());
    }

    #[test]
    fn rejects_screensaver_category() {
        let tmp = tempfile::tempdir().unwrap();
        write_entry(
            tmp.path(),
            "saver.desktop",
            "[Desktop Entry]\nType=Application\nName=X\nExec=x\nCategories=Screensaver;\n",
        );
        assert!(parse_desktop_file(&tmp.path().join("saver.desktop")).is_none());
    }

    #[test]
    fn rejects_empty_exec() {
        let tmp = tempfile::tempdir().unwrap();
        write_entry(
            tmp.path(),
            "noexec.desktop",
            "[Desktop Entry]\nType=Application\nName=X\nExec=\n",
        );
        assert!(parse_desktop_file(&tmp.path().join("noexec.desktop")).is_none());
    }

    #[test]
    fn rejects_dangling_tryexec() {
        let tmp = tempfile::tempdir().unwrap();
        write_entry(
            tmp.path(),
            "dangling.desktop",
            "[Desktop Entry]\nType=Application\nName=X\nExec=x\nTryExec=definitely-not-a-real-binary-xyz\n",
        );
        assert!(parse_desktop_file(&tmp.path().join("dangling.desktop")).is_none());
    }

    #[test]
    fn accepts_resolvable_tryexec() {
        let tmp = tempfile::tempdir().unwrap();
        write_entry(
            tmp.path(),
            "ok.desktop",
            "[Desktop Entry]\nType=Application\nName=X\nExec=sh -c true\nTryExec=sh\n",
        );
        assert!(parse_desktop_file(&tmp.path().join("ok.desktop")).is_some());
    }

    #[test]
    fn refresh_force_true_replaces_the_index() {
        let _guard = ENV_LOCK.lock().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let apps = tmp.path().join("applications");
        fs::create_dir_all(&apps).unwrap();
        write_entry(
            &apps,
            "a.desktop",
            "[Desktop Entry]\nType=Application\nName=A\nExec=a\n",
        );

        unsafe {
            std::env::set_var("XDG_DATA_HOME", tmp.path());
            std::env::set_var("XDG_DATA_DIRS", "/nonexistent-for-test");
        }

        let mut index = Index::load();
        assert_eq!(index.records().len(), 1);

        write_entry(
            &apps,
            "b.desktop",
            "[Desktop Entry]\nType=Application\nName=B\nExec=b\n",
        );
        index.refresh(true);
        assert_eq!(index.records().len(), 2);
    }
}
