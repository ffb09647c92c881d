//! Corpus enumeration.
//!
//! Walks a file or directory tree depth-first, visiting siblings in byte-wise
//! name order, and yields every regular file whose suffix matches the filter.
//! Each call to [`enumerate`] builds an independent walker, so sequences are
//! restartable and never share a cursor.

use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::{HarnessError, Result};

/// One matching file found during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    path: PathBuf,
    relative: PathBuf,
}

impl CorpusEntry {
    /// Full path as reached from the enumeration root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the enumeration root. For a file root this is just
    /// the file name.
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Base name of the file, lossily converted for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Suffix of the file, including the leading `.`.
    pub fn suffix(&self) -> Option<String> {
        file_suffix(&self.path)
    }
}

/// Final extension of `path` including the leading `.`, e.g. `.cnf`.
///
/// Dot-files such as `.cnf` have no suffix.
pub fn file_suffix(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

/// Lazily enumerate the files under `path` whose suffix equals `suffix`.
///
/// A regular-file `path` yields itself iff it matches. A directory is
/// expanded in place, children sorted by name. Errors are yielded at the
/// point of traversal that hits them; a missing root is the first item.
pub fn enumerate(path: impl AsRef<Path>, suffix: Option<&str>) -> Entries {
    let root = path.as_ref().to_path_buf();
    let walker = WalkDir::new(&root)
        .follow_links(true)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter();

    Entries {
        root,
        suffix: suffix.map(str::to_string),
        walker,
    }
}

/// Iterator returned by [`enumerate`].
pub struct Entries {
    root: PathBuf,
    suffix: Option<String>,
    walker: walkdir::IntoIter,
}

impl Entries {
    fn matches(&self, path: &Path) -> bool {
        match &self.suffix {
            None => true,
            Some(wanted) => file_suffix(path).as_deref() == Some(wanted.as_str()),
        }
    }

    fn entry_for(&self, path: &Path) -> CorpusEntry {
        let relative = match path.strip_prefix(&self.root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => path.file_name().map(PathBuf::from).unwrap_or_default(),
        };
        CorpusEntry {
            path: path.to_path_buf(),
            relative,
        }
    }

    fn classify(&self, err: walkdir::Error) -> HarnessError {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        if let Some(ancestor) = err.loop_ancestor() {
            return HarnessError::TraversalLoop {
                path,
                ancestor: ancestor.to_path_buf(),
            };
        }

        match err.into_io_error() {
            Some(source) if source.kind() == io::ErrorKind::NotFound => {
                HarnessError::PathNotFound(path)
            }
            Some(source) => HarnessError::NotReadable { path, source },
            None => HarnessError::NotReadable {
                path,
                source: io::Error::other("walk failed"),
            },
        }
    }
}

impl Iterator for Entries {
    type Item = Result<CorpusEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(self.classify(err))),
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            if !file_type.is_file() {
                debug!("Skipping special file {}", entry.path().display());
                continue;
            }
            if self.matches(entry.path()) {
                return Some(Ok(self.entry_for(entry.path())));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "p cnf 1 1\n1 0\n").unwrap();
    }

    fn relatives(root: &Path, suffix: Option<&str>) -> Vec<String> {
        enumerate(root, suffix)
            .map(|e| e.unwrap().relative().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_file_suffix() {
        assert_eq!(file_suffix(Path::new("a.cnf")).as_deref(), Some(".cnf"));
        assert_eq!(file_suffix(Path::new("dir/a.tar.cnf")).as_deref(), Some(".cnf"));
        assert_eq!(file_suffix(Path::new("README")), None);
        assert_eq!(file_suffix(Path::new(".cnf")), None);
    }

    #[test]
    fn test_scenario_order_and_filter() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("b.cnf"));
        touch(&dir.path().join("sub/c.cnf"));
        touch(&dir.path().join("a.cnf"));
        touch(&dir.path().join("d.txt"));

        assert_eq!(
            relatives(dir.path(), Some(".cnf")),
            vec!["a.cnf", "b.cnf", "sub/c.cnf"]
        );
    }

    #[test]
    fn test_unset_suffix_yields_every_file() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.cnf"));
        touch(&dir.path().join("d.txt"));
        touch(&dir.path().join("noext"));

        assert_eq!(relatives(dir.path(), None), vec!["a.cnf", "d.txt", "noext"]);
    }

    #[test]
    fn test_directories_expand_in_place() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a/z.cnf"));
        touch(&dir.path().join("a/b/y.cnf"));
        touch(&dir.path().join("b.cnf"));
        touch(&dir.path().join("c/x.cnf"));

        assert_eq!(
            relatives(dir.path(), Some(".cnf")),
            vec!["a/b/y.cnf", "a/z.cnf", "b.cnf", "c/x.cnf"]
        );
    }

    #[test]
    fn test_bytewise_sibling_order() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.cnf"));
        touch(&dir.path().join("B.cnf"));
        touch(&dir.path().join("_.cnf"));
        touch(&dir.path().join("10.cnf"));
        touch(&dir.path().join("9.cnf"));

        assert_eq!(
            relatives(dir.path(), Some(".cnf")),
            vec!["10.cnf", "9.cnf", "B.cnf", "_.cnf", "a.cnf"]
        );
    }

    #[test]
    fn test_deep_tree_yields_each_match_once() {
        let dir = tempdir().unwrap();
        let mut nested = dir.path().to_path_buf();
        for depth in 0..12 {
            nested = nested.join(format!("level{}", depth));
            touch(&nested.join("deep.cnf"));
            touch(&nested.join("deep.log"));
        }

        let entries: Vec<_> = enumerate(dir.path(), Some(".cnf"))
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(entries.len(), 12);
        assert!(entries.iter().all(|e| e.file_name() == "deep.cnf"));
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("x/1.cnf"));
        touch(&dir.path().join("x/2.cnf"));
        touch(&dir.path().join("0.cnf"));

        let first = relatives(dir.path(), Some(".cnf"));
        let second = relatives(dir.path(), Some(".cnf"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_independent_sequences() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.cnf"));
        touch(&dir.path().join("b.cnf"));

        let mut first = enumerate(dir.path(), Some(".cnf"));
        let mut second = enumerate(dir.path(), Some(".cnf"));
        assert_eq!(first.next().unwrap().unwrap().file_name(), "a.cnf");
        assert_eq!(second.next().unwrap().unwrap().file_name(), "a.cnf");
        assert_eq!(first.next().unwrap().unwrap().file_name(), "b.cnf");
        assert!(first.next().is_none());
        assert_eq!(second.next().unwrap().unwrap().file_name(), "b.cnf");
    }

    #[test]
    fn test_file_root_matching() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("single.cnf");
        touch(&file);

        let entries: Vec<_> = enumerate(&file, Some(".cnf")).map(|e| e.unwrap()).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path(), file.as_path());
        assert_eq!(entries[0].relative(), Path::new("single.cnf"));
        assert_eq!(entries[0].suffix().as_deref(), Some(".cnf"));
    }

    #[test]
    fn test_file_root_not_matching() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("single.txt");
        touch(&file);

        assert_eq!(enumerate(&file, Some(".cnf")).count(), 0);
        assert_eq!(enumerate(&file, None).count(), 1);
    }

    #[test]
    fn test_missing_root_fails_on_first_item() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let mut entries = enumerate(&missing, Some(".cnf"));
        match entries.next() {
            Some(Err(HarnessError::PathNotFound(path))) => assert_eq!(path, missing),
            other => panic!("expected PathNotFound, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_root_is_not_readable() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.cnf");
        touch(&file);
        let below_file = file.join("child");

        let mut entries = enumerate(&below_file, Some(".cnf"));
        match entries.next() {
            Some(Err(HarnessError::NotReadable { path, .. })) => assert_eq!(path, below_file),
            other => panic!("expected NotReadable, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_fails_in_place() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.cnf"));
        touch(&dir.path().join("c.cnf"));
        std::os::unix::fs::symlink(dir.path().join("gone.cnf"), dir.path().join("b.cnf")).unwrap();

        let results: Vec<_> = enumerate(dir.path(), Some(".cnf")).collect();
        assert_eq!(results.len(), 3);
        match &results[0] {
            Ok(entry) => assert_eq!(entry.file_name(), "a.cnf"),
            Err(e) => panic!("expected a.cnf, got {}", e),
        }
        match &results[1] {
            Err(HarnessError::PathNotFound(path)) => assert_eq!(path, &dir.path().join("b.cnf")),
            other => panic!("expected PathNotFound, got {:?}", other),
        }
        assert!(matches!(&results[2], Ok(entry) if entry.file_name() == "c.cnf"));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        assert_eq!(enumerate(dir.path(), Some(".cnf")).count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_followed_file_link() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("store/real.cnf");
        touch(&target);
        fs::create_dir(dir.path().join("corpus")).unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("corpus/linked.cnf")).unwrap();

        assert_eq!(
            relatives(&dir.path().join("corpus"), Some(".cnf")),
            vec!["linked.cnf"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_link_cycle_fails_loudly() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("sub/a.cnf"));
        std::os::unix::fs::symlink(dir.path(), dir.path().join("sub/back")).unwrap();

        let results: Vec<_> = enumerate(dir.path(), Some(".cnf")).collect();
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(HarnessError::TraversalLoop { .. })))
        );
    }
}
