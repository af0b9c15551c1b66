//! The per-command log file under the user's cache directory.
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::subscriber::{Kind, message_of};
use crate::commands::version::version_string;

/// `$XDG_CACHE_HOME/dotfiles`, falling back to `$HOME/.cache/dotfiles`.
fn log_dir(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let non_empty = |key: &str| env(key).filter(|v| !v.is_empty());
    let cache = non_empty("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| non_empty("HOME").map(|home| Path::new(&home).join(".cache")))?;
    Some(cache.join("dotfiles"))
}

/// `<log dir>/<command>.log`, creating the directory. `None` when neither
/// variable is set or the directory cannot be created; the run then goes
/// without a log file.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = log_dir(|key| std::env::var(key).ok())?;
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Appends every event, at every level, to the log file as
/// `HH:MM:SS <tag> message`.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open the log file for `command`.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::open(&log_file_path(command)?, command)
    }

    /// Truncate `path` and start it with a one-line run header.
    pub(super) fn open(path: &Path, command: &str) -> Option<Self> {
        let mut file = fs::File::create(path).ok()?;
        writeln!(
            file,
            "# dotfiles {command} {} started {}",
            version_string(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )
        .ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _: tracing_subscriber::layer::Context<'_, S>) {
        let time = chrono::Local::now().format("%H:%M:%S");
        let msg = message_of(event);
        let line = match Kind::of(event.metadata()).file_tag() {
            "" => format!("{time} {msg}"),
            tag => format!("{time} {tag} {msg}"),
        };
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "{line}").ok();
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn dir_with(vars: &[(&str, &str)]) -> Option<PathBuf> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        log_dir(|key| env.get(key).cloned())
    }

    #[test]
    fn xdg_cache_home_wins() {
        assert_eq!(
            dir_with(&[("XDG_CACHE_HOME", "/xdg"), ("HOME", "/home/u")]),
            Some(PathBuf::from("/xdg/dotfiles"))
        );
    }

    #[test]
    fn empty_xdg_falls_back_to_home() {
        assert_eq!(
            dir_with(&[("XDG_CACHE_HOME", ""), ("HOME", "/home/u")]),
            Some(PathBuf::from("/home/u/.cache/dotfiles"))
        );
    }

    #[test]
    fn no_variables_means_no_log_file() {
        assert_eq!(dir_with(&[]), None);
    }

    #[test]
    fn open_writes_run_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("install.log");
        fs::write(&path, "stale").unwrap();
        FileLayer::open(&path, "install").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# dotfiles install "));
        assert!(!contents.contains("stale"));
    }
}
