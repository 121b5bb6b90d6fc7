//! The overlay disk.
//!
//! Two maps guarded by reader/writer locks:
//!
//! - `current`: the authoritative view for the run. Listing follows insertion
//!   order; overwriting a name keeps its original slot.
//! - `original`: the first content observed for a path read through from real
//!   storage. Each path is written at most once and never changed afterwards,
//!   which makes it the rollback reference point.
//!
//! A path in `current` exists for the rest of the run unless deleted. A path
//! only in `original` is considered deleted (or not yet restored).

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use tracing::debug;

use crate::file::File;

#[derive(Debug, Default)]
pub struct Disk {
    original: RwLock<HashMap<String, File>>,
    current: RwLock<IndexMap<String, File>>,
}

// Entries are whole `File` values swapped in under the lock, so a poisoned
// map is still consistent and safe to keep using.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl Disk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `current[file.name()]`.
    pub fn add(&self, file: File) {
        debug!(name = file.name(), len = file.len(), "disk add");
        write(&self.current).insert(file.name().to_string(), file);
    }

    /// Remove `name` from the current view.
    ///
    /// Deleting a name that is not present is a no-op. Returns the removed
    /// file, if any.
    pub fn delete(&self, name: &str) -> Option<File> {
        let removed = write(&self.current).shift_remove(name);
        debug!(name, removed = removed.is_some(), "disk delete");
        removed
    }

    /// Look up `name` in the current view.
    pub fn find(&self, name: &str) -> Option<File> {
        read(&self.current).get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        read(&self.current).contains_key(name)
    }

    /// Snapshot of every file in the current view, in insertion order.
    pub fn files(&self) -> Vec<File> {
        read(&self.current).values().cloned().collect()
    }

    pub fn names(&self) -> Vec<String> {
        read(&self.current).keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        read(&self.current).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.current).is_empty()
    }

    /// Record `file` as the first-observed content of its path.
    ///
    /// Only the first call per path has any effect. Returns whether the
    /// snapshot was stored.
    pub fn remember(&self, file: File) -> bool {
        let mut original = write(&self.original);
        if original.contains_key(file.name()) {
            return false;
        }
        debug!(name = file.name(), "disk snapshot");
        original.insert(file.name().to_string(), file);
        true
    }

    /// Fold a file read from real storage into the disk: snapshot it (first
    /// time only) and make it part of the current view.
    pub fn capture(&self, file: File) {
        self.remember(file.clone());
        self.add(file);
    }

    /// The first-observed content of `name`, if it was ever captured.
    pub fn original(&self, name: &str) -> Option<File> {
        read(&self.original).get(name).cloned()
    }

    /// Restore every snapshot into the current view.
    ///
    /// Paths that were never captured are untouched, so purely virtual
    /// additions survive a rollback. Snapshots are restored in name order to
    /// keep the resulting listing deterministic.
    pub fn rollback(&self) {
        let mut snapshots: Vec<File> = read(&self.original).values().cloned().collect();
        snapshots.sort_by(|a, b| a.name().cmp(b.name()));
        debug!(restored = snapshots.len(), "disk rollback");

        let mut current = write(&self.current);
        for file in snapshots {
            current.insert(file.name().to_string(), file);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn names(disk: &Disk) -> Vec<String> {
        disk.files().iter().map(|f| f.name().to_string()).collect()
    }

    #[test]
    fn add_then_find() {
        let disk = Disk::new();
        disk.add(File::new("a.txt", "a"));
        assert!(disk.contains("a.txt"));
        assert_eq!(disk.find("a.txt").unwrap().to_string(), "a");
        assert!(disk.find("b.txt").is_none());
    }

    #[test]
    fn overwrite_keeps_single_entry() {
        let disk = Disk::new();
        disk.add(File::new("foo.txt", "Hello mark"));
        disk.add(File::new("foo.txt", "Hello world"));

        let files = disk.files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name(), "foo.txt");
        assert_eq!(files[0].to_string(), "Hello world");
    }

    #[test]
    fn listing_follows_insertion_order() {
        let disk = Disk::new();
        disk.add(File::new("c", ""));
        disk.add(File::new("a", ""));
        disk.add(File::new("b", ""));
        disk.add(File::new("a", "again"));
        assert_eq!(names(&disk), vec!["c", "a", "b"]);

        disk.delete("a");
        assert_eq!(names(&disk), vec!["c", "b"]);
    }

    #[test]
    fn delete_missing_is_noop() {
        let disk = Disk::new();
        disk.add(File::new("keep", "k"));
        assert!(disk.delete("missing").is_none());
        assert_eq!(disk.len(), 1);
    }

    #[test]
    fn remember_is_write_once() {
        let disk = Disk::new();
        assert!(disk.remember(File::new("a", "first")));
        assert!(!disk.remember(File::new("a", "second")));
        assert_eq!(disk.original("a").unwrap().to_string(), "first");
        // Snapshots are not part of the current view.
        assert!(disk.is_empty());
    }

    #[test]
    fn capture_snapshots_and_adds() {
        let disk = Disk::new();
        disk.capture(File::new("a", "seen"));
        assert_eq!(disk.find("a").unwrap().to_string(), "seen");
        assert_eq!(disk.original("a").unwrap().to_string(), "seen");

        disk.add(File::new("a", "changed"));
        assert_eq!(disk.original("a").unwrap().to_string(), "seen");
    }

    #[test]
    fn rollback_restores_snapshots_only() {
        let disk = Disk::new();
        disk.remember(File::new("foo.txt", "foo"));
        disk.remember(File::new("bar.txt", "bar"));
        disk.add(File::new("foo.txt", "overwritten"));
        disk.add(File::new("new.txt", "new"));

        disk.rollback();

        assert_eq!(disk.find("foo.txt").unwrap().to_string(), "foo");
        assert_eq!(disk.find("bar.txt").unwrap().to_string(), "bar");
        assert_eq!(disk.find("new.txt").unwrap().to_string(), "new");
        assert_eq!(disk.len(), 3);
    }

    #[test]
    fn concurrent_adds() {
        let disk = Arc::new(Disk::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let disk = Arc::clone(&disk);
                thread::spawn(move || {
                    for j in 0..50 {
                        disk.add(File::new(format!("{}-{}", i, j), "x"));
                        let _ = disk.files();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(disk.len(), 400);
    }
}
