use std::{fs, io, path::Path};

use walkdir::WalkDir;

use super::{Asset, AssetProvider};

/// An asset provider implementation for a file system. It reads a file tree from a provided directory.
///
/// Logical names are paths relative to the directory, separated with `/`.
/// Hidden entries (starting with `.`) below the root and files listed in `exclude` are skipped.
pub struct FsAssetProvider {
    src_dir: Box<Path>,
    exclude: Vec<Box<str>>,
}
impl FsAssetProvider {
    /// Creates an asset provider with a source directory path.
    pub fn new(src_dir: impl Into<Box<Path>>) -> Self {
        Self { src_dir: src_dir.into(), exclude: Vec::new() }
    }

    /// Skips a logical name (for example the manifest written by a previous run into the same directory).
    #[must_use]
    pub fn exclude(mut self, name: impl Into<Box<str>>) -> Self {
        self.exclude.push(name.into());
        self
    }
}
impl AssetProvider for FsAssetProvider {
    fn list_assets(self) -> io::Result<Vec<Asset>> {
        let mut v = Vec::new();
        let walker = WalkDir::new(&self.src_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
        for de in walker {
            let de = de.map_err(io::Error::from)?;
            if !de.file_type().is_file() {
                continue;
            }
            let Some(rel) = pathdiff::diff_paths(de.path(), &self.src_dir) else {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid entry path: {}", de.path().display())))
            };
            let name = logical_name(&rel)?;
            if self.exclude.iter().any(|x| **x == *name) {
                continue;
            }
            let content = fs::read(de.path())?;
            v.push(Asset::new(name, content));
        }
        Ok(v)
    }
}

fn logical_name(rel: &Path) -> io::Result<String> {
    let mut parts = Vec::new();
    for c in rel.components() {
        let Some(s) = c.as_os_str().to_str() else {
            return Err(io::Error::new(io::ErrorKind::InvalidData, format!("Invalid file name: {}", rel.display())))
        };
        parts.push(s);
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_nested_files_with_relative_names() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("css/vendor")).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("css/app.css"), "body {}").unwrap();
        fs::write(dir.path().join("css/vendor/x.css"), "a {}").unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref").unwrap();
        fs::write(dir.path().join("staticfiles.json"), "{}").unwrap();

        let assets = FsAssetProvider::new(dir.path())
            .exclude("staticfiles.json")
            .list_assets()
            .unwrap();
        let names: Vec<_> = assets.iter().map(|a| &*a.name).collect();
        assert_eq!(names, ["css/app.css", "css/vendor/x.css"]);
        assert_eq!(&assets[0].content[..], b"body {}");
    }

    #[test]
    fn missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let r = FsAssetProvider::new(dir.path().join("nope")).list_assets();
        assert!(r.is_err());
    }
}
