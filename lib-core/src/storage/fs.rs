use std::{fs, io::{self, Write}, path::{Component, Path, PathBuf}};

use bytes::Bytes;
use tempfile::NamedTempFile;

use super::Storage;

/// A storage implementation for a file system. It writes objects into a provided directory.
///
/// Every write goes to a temporary file in the target directory which is then renamed over
/// the destination, so a reader never sees a partially written file.
pub struct FsStorage {
    dest_dir: Box<Path>
}
impl FsStorage {
    /// Creates a storage with a destination directory path.
    pub fn new(dest_dir: impl Into<Box<Path>>) -> Self {
        Self { dest_dir: dest_dir.into() }
    }

    /// Returns the destination directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dest_dir
    }

    fn path_of(&self, name: &str) -> io::Result<PathBuf> {
        let rel = Path::new(name);
        if name.is_empty() || !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid object name: {name}")))
        }
        Ok(self.dest_dir.join(rel))
    }
}
impl Storage for FsStorage {
    fn write(&self, name: &str, data: &[u8]) -> io::Result<()> {
        let fp = self.path_of(name)?;
        let parent = fp.parent().unwrap_or(&self.dest_dir);
        fs::create_dir_all(parent)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&fp).map_err(|e| e.error)?;
        Ok(())
    }
    fn read(&self, name: &str) -> io::Result<Option<Bytes>> {
        match fs::read(self.path_of(name)?) {
            Ok(v) => Ok(Some(v.into())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
        }
    }
    fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_ok_and(|p| p.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let st = FsStorage::new(dir.path());
        st.write("css/app.1234.css", b"a{}").unwrap();
        assert_eq!(fs::read(dir.path().join("css/app.1234.css")).unwrap(), b"a{}");
        assert!(st.exists("css/app.1234.css"));
    }

    #[test]
    fn overwrite_leaves_no_temporary_files() {
        let dir = tempdir().unwrap();
        let st = FsStorage::new(dir.path());
        st.write("m.json", b"old").unwrap();
        st.write("m.json", b"new").unwrap();
        assert_eq!(st.read("m.json").unwrap().as_deref(), Some(&b"new"[..]));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_objects_read_as_none() {
        let dir = tempdir().unwrap();
        let st = FsStorage::new(dir.path());
        assert_eq!(st.read("nope.json").unwrap(), None);
        assert!(!st.exists("nope.json"));
    }

    #[test]
    fn rejects_escaping_names() {
        let dir = tempdir().unwrap();
        let st = FsStorage::new(dir.path().join("out"));
        assert_eq!(st.write("../x", b"1").unwrap_err().kind(), io::ErrorKind::InvalidInput);
        assert_eq!(st.write("/etc/x", b"1").unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }
}
