//! Feeds execution plan resources from a directory into a resource tracker.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use enhancer_chain::InMemoryResourceTracker;
use tracing::debug;

/// Resource changes applied by a single [`DataDirFeeder::sync`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub published: Vec<String>,
    pub withdrawn: Vec<String>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.published.is_empty() && self.withdrawn.is_empty()
    }
}

/// Mirrors the regular files of a directory into an [`InMemoryResourceTracker`].
///
/// The resource name is the file name. Files are only republished when their
/// content changed, so listeners see one update per actual change.
#[derive(Debug)]
pub struct DataDirFeeder {
    dir: PathBuf,
    tracker: Arc<InMemoryResourceTracker>,
}

impl DataDirFeeder {
    pub fn new(dir: impl Into<PathBuf>, tracker: Arc<InMemoryResourceTracker>) -> Self {
        Self {
            dir: dir.into(),
            tracker,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Publish new and changed files, withdraw resources whose file is gone
    pub fn sync(&self) -> io::Result<SyncReport> {
        let mut report = SyncReport::default();
        let mut present = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                debug!(path = %entry.path().display(), "Skipping file with a non UTF-8 name");
                continue;
            };

            let bytes = fs::read(entry.path())?;
            if self.tracker.resource(&name).as_deref() != Some(bytes.as_slice()) {
                self.tracker.publish(&name, bytes);
                report.published.push(name.clone());
            }
            present.push(name);
        }

        for name in self.tracker.resource_names() {
            if !present.contains(&name) && self.tracker.withdraw(&name) {
                report.withdrawn.push(name);
            }
        }

        report.published.sort();
        report.withdrawn.sort();
        if !report.is_empty() {
            debug!(
                dir = %self.dir.display(),
                published = ?report.published,
                withdrawn = ?report.withdrawn,
                "Synchronized data directory"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feeder() -> (tempfile::TempDir, Arc<InMemoryResourceTracker>, DataDirFeeder) {
        let dir = tempfile::tempdir().unwrap();
        let tracker = Arc::new(InMemoryResourceTracker::new());
        let feeder = DataDirFeeder::new(dir.path(), tracker.clone());
        (dir, tracker, feeder)
    }

    #[test]
    fn test_initial_sync_publishes_files() {
        let (dir, tracker, feeder) = feeder();
        fs::write(dir.path().join("b.nt"), "b").unwrap();
        fs::write(dir.path().join("a.nt"), "a").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let report = feeder.sync().unwrap();
        assert_eq!(report.published, vec!["a.nt", "b.nt"]);
        assert_eq!(tracker.resource("a.nt"), Some(b"a".to_vec()));
        assert_eq!(tracker.resource_names().len(), 2);
    }

    #[test]
    fn test_unchanged_files_are_not_republished() {
        let (dir, _, feeder) = feeder();
        fs::write(dir.path().join("a.nt"), "a").unwrap();
        feeder.sync().unwrap();

        assert!(feeder.sync().unwrap().is_empty());

        fs::write(dir.path().join("a.nt"), "changed").unwrap();
        assert_eq!(feeder.sync().unwrap().published, vec!["a.nt"]);
    }

    #[test]
    fn test_removed_files_are_withdrawn() {
        let (dir, tracker, feeder) = feeder();
        fs::write(dir.path().join("a.nt"), "a").unwrap();
        feeder.sync().unwrap();

        fs::remove_file(dir.path().join("a.nt")).unwrap();
        let report = feeder.sync().unwrap();
        assert_eq!(report.withdrawn, vec!["a.nt"]);
        assert_eq!(tracker.resource("a.nt"), None);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let feeder = DataDirFeeder::new(
            dir.path().join("missing"),
            Arc::new(InMemoryResourceTracker::new()),
        );
        assert_eq!(feeder.sync().unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
