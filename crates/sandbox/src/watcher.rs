//! Hot-reload directory watcher (§4.4 "Hot-reload watcher").
//!
//! Polls the watched directories rather than relying on a native
//! filesystem event API, so behavior is identical across platforms and in
//! containers with network-mounted volumes. Debouncing is done by
//! requiring a path's mtime to be unchanged across two consecutive polls
//! at least `debounce` apart before it's surfaced as an event.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// A detected change to a watched directory, ready for the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A new or modified component source file, stable for one debounce
    /// period. The component id is its file stem.
    Changed { id: String, path: PathBuf },
    /// A previously-seen file disappeared.
    Removed { id: String },
}

struct SeenFile {
    mtime: SystemTime,
    stable_since: SystemTime,
    announced: bool,
}

/// Watches a set of directories for files with a given extension (e.g.
/// `.star`), ignoring any file whose stem ends in `_test`.
pub struct Watcher {
    dirs: Vec<PathBuf>,
    extension: String,
    debounce: Duration,
    seen: HashMap<PathBuf, SeenFile>,
}

impl Watcher {
    #[must_use]
    pub fn new(dirs: Vec<PathBuf>, extension: impl Into<String>, debounce: Duration) -> Self {
        Self { dirs, extension: extension.into(), debounce, seen: HashMap::new() }
    }

    /// Scan the watched directories once and return any events a fresh
    /// scan produced. Call this on a timer (the caller owns the polling
    /// loop, so tests don't have to wait on a real clock).
    pub fn poll(&mut self, now: SystemTime) -> std::io::Result<Vec<WatchEvent>> {
        let mut present = HashMap::new();
        for dir in &self.dirs {
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err),
            };
            for entry in entries {
                let entry = entry?;
                let path = entry.path();
                if !self.is_watched(&path) {
                    continue;
                }
                let mtime = entry.metadata()?.modified()?;
                present.insert(path, mtime);
            }
        }

        let mut events = Vec::new();

        for (path, mtime) in &present {
            let seen = self.seen.entry(path.clone()).or_insert(SeenFile {
                mtime: *mtime,
                stable_since: now,
                announced: false,
            });
            if seen.mtime != *mtime {
                seen.mtime = *mtime;
                seen.stable_since = now;
                seen.announced = false;
            }
            let stable_for = now.duration_since(seen.stable_since).unwrap_or_default();
            if !seen.announced && stable_for >= self.debounce {
                seen.announced = true;
                events.push(WatchEvent::Changed { id: component_id(path), path: path.clone() });
            }
        }

        let removed: Vec<PathBuf> = self
            .seen
            .keys()
            .filter(|path| !present.contains_key(*path))
            .cloned()
            .collect();
        for path in removed {
            self.seen.remove(&path);
            events.push(WatchEvent::Removed { id: component_id(&path) });
        }

        Ok(events)
    }

    fn is_watched(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else { return false };
        if ext != self.extension {
            return false;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        !stem.ends_with("_test")
    }
}

fn component_id(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn a_stable_new_file_is_announced_after_the_debounce_window() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("billing.star"), "component source").unwrap();
        let mut watcher = Watcher::new(vec![dir.path().to_owned()], "star", Duration::from_millis(500));

        let t0 = SystemTime::now();
        let events = watcher.poll(t0).unwrap();
        assert!(events.is_empty(), "not yet stable for a full debounce window");

        let t1 = t0 + Duration::from_millis(600);
        let events = watcher.poll(t1).unwrap();
        assert_eq!(events, vec![WatchEvent::Changed { id: "billing".to_owned(), path: dir.path().join("billing.star") }]);
    }

    #[test]
    fn the_same_stable_file_is_not_announced_twice() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("billing.star"), "component source").unwrap();
        let mut watcher = Watcher::new(vec![dir.path().to_owned()], "star", Duration::from_millis(100));

        let t0 = SystemTime::now();
        watcher.poll(t0).unwrap();
        let events = watcher.poll(t0 + Duration::from_millis(200)).unwrap();
        assert_eq!(events.len(), 1);
        let events = watcher.poll(t0 + Duration::from_millis(300)).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn removing_a_file_emits_a_removed_event() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("billing.star");
        fs::write(&path, "component source").unwrap();
        let mut watcher = Watcher::new(vec![dir.path().to_owned()], "star", Duration::from_millis(0));

        let t0 = SystemTime::now();
        watcher.poll(t0).unwrap();
        fs::remove_file(&path).unwrap();
        let events = watcher.poll(t0 + Duration::from_millis(10)).unwrap();
        assert_eq!(events, vec![WatchEvent::Removed { id: "billing".to_owned() }]);
    }

    #[test]
    fn test_files_are_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("billing_test.star"), "x").unwrap();
        let mut watcher = Watcher::new(vec![dir.path().to_owned()], "star", Duration::from_millis(0));
        let events = watcher.poll(SystemTime::now() + Duration::from_secs(1)).unwrap();
        assert!(events.is_empty());
    }
}
