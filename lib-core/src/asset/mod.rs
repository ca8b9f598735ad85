/// Asset provider for a file system directory.
pub mod fs;

use std::{io, sync::Arc};

use bytes::Bytes;

use crate::compress::Encoding;

/// An input file: a logical name and its raw content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    /// Stable, `/`-separated path as referenced by application code (`css/app.css`).
    pub name: Arc<str>,
    /// Raw content.
    pub content: Bytes,
}
impl Asset {
    /// Creates an asset from a name and content.
    pub fn new(name: impl Into<Arc<str>>, content: impl Into<Bytes>) -> Self {
        Self { name: name.into(), content: content.into() }
    }
}

/// An asset after minification and hashing.
#[derive(Clone, Debug)]
pub struct ProcessedAsset {
    /// Logical name of the source asset.
    pub name: Arc<str>,
    /// Content that is stored and served (minified if a minifier applied).
    pub content: Bytes,
    /// Fingerprint of `content`.
    pub token: Box<str>,
    /// Logical name with the token inserted.
    pub hashed_name: Box<str>,
}

/// An alternate encoding of a processed asset.
#[derive(Clone, Debug)]
pub struct CompressedArtifact {
    /// Encoding of the content.
    pub encoding: Encoding,
    /// Hashed output name with the encoding suffix.
    pub name: Box<str>,
    /// Compressed content.
    pub content: Bytes,
}

/// A source of assets for a pipeline run. Typically used with `Pipeline::run`.
/// Any function that returns a list of assets can be used as a custom provider.
pub trait AssetProvider {
    /// Lists all assets. The order is not meaningful.
    fn list_assets(self) -> io::Result<Vec<Asset>>;
}

impl AssetProvider for Vec<Asset> {
    fn list_assets(self) -> io::Result<Vec<Asset>> {
        Ok(self)
    }
}

impl<T: FnOnce() -> io::Result<Vec<Asset>>> AssetProvider for T {
    fn list_assets(self) -> io::Result<Vec<Asset>> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_providers() {
        let p = || -> io::Result<Vec<Asset>> { Ok(vec![Asset::new("a.css", &b"a{}"[..])]) };
        let v = p.list_assets().unwrap();
        assert_eq!(&*v[0].name, "a.css");
        assert_eq!(&v[0].content[..], b"a{}");
    }

    #[test]
    fn provider_errors_propagate() {
        let p = || -> io::Result<Vec<Asset>> { Err(io::Error::new(io::ErrorKind::NotFound, "gone")) };
        assert_eq!(p.list_assets().unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
