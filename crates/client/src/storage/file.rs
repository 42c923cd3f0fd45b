//! File-backed storage backend.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError};

/// A [`KeyValueStore`] keeping one file per key under a directory.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// target, so a crash mid-write leaves either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", encode_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(io_error(key, source)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(|source| io_error(key, source))?;

        let path = self.path_for(key);
        let tmp_path = self
            .root
            .join(format!(".{}.tmp.{}", encode_key(key), std::process::id()));

        fs::write(&tmp_path, value).map_err(|source| io_error(key, source))?;
        if let Err(source) = rename_overwrite(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(io_error(key, source));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(io_error(key, source)),
        }
    }
}

fn io_error(key: &str, source: io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_owned(),
        source,
    }
}

/// Map a key to a file name stem.
///
/// ASCII alphanumerics and `@ . _ + -` pass through; every other byte becomes
/// `%XX`. A leading `.` is escaped too, so no key maps to a hidden file or
/// walks out of the directory.
fn encode_key(key: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(key.len());
    for (i, &b) in key.as_bytes().iter().enumerate() {
        let safe = b.is_ascii_alphanumeric() || matches!(b, b'@' | b'_' | b'+' | b'-')
            || (b == b'.' && i > 0);
        if safe {
            out.push(char::from(b));
        } else {
            out.push('%');
            out.push(char::from(HEX[usize::from(b >> 4)]));
            out.push(char::from(HEX[usize::from(b & 0x0f)]));
        }
    }
    out
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("matzip_places_a@b.com"), "matzip_places_a@b.com");
        assert_eq!(encode_key("a/b"), "a%2Fb");
        assert_eq!(encode_key(".."), "%2E.");
        assert_eq!(encode_key("accessToken"), "accessToken");
    }

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));

        assert!(store.get("k").unwrap().is_none());
        store.set("k", "[1,2]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[1,2]"));

        store.set("k", "[]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[]"));

        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
        store.remove("k").unwrap();
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("matzip_places_global", "[]").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["matzip_places_global.json"]);
    }

    #[test]
    fn test_write_fails_when_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let store = FileStore::new(&blocker);
        assert!(matches!(
            store.set("k", "v"),
            Err(StorageError::Io { .. })
        ));
    }
}
