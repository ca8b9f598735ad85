use std::{fmt, str::FromStr};

use crate::{cfg, errors::CompressError};

/// GZip compressor (deflate family)
pub mod gzip;

/// Brotli compressor
pub mod brotli;

/// An alternate encoding of an asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Encoding {
    /// Brotli (`Content-Encoding: br`), stored with a `.br` suffix.
    Brotli,
    /// GZip (`Content-Encoding: gzip`), stored with a `.gz` suffix.
    Gzip,
}
impl Encoding {
    /// All encodings supported by this library, in order of preference when serving.
    pub const ALL: [Self; 2] = [Self::Brotli, Self::Gzip];

    /// Returns the encoding identifier used in the manifest and HTTP headers.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Brotli => "br",
        }
    }

    /// Returns the file name suffix of compressed artifacts.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Gzip => ".gz",
            Self::Brotli => ".br",
        }
    }

    /// Returns the stored name of an artifact for a hashed output name.
    #[must_use]
    pub fn artifact_name(self, hashed_name: &str) -> String {
        let mut s = String::with_capacity(hashed_name.len() + 3);
        s.push_str(hashed_name);
        s.push_str(self.suffix());
        s
    }

    /// Compresses data and writes the result in provided vec.
    /// # Errors
    /// Returns an error if the encoder fails
    pub fn compress(self, cfgmap: &cfg::ConfigMap, v: &[u8], vout: &mut Vec<u8>) -> Result<(), CompressError> {
        match self {
            Self::Gzip => cfgmap.fetch::<gzip::CompressorGzip>().compress(v, vout),
            Self::Brotli => cfgmap.fetch::<brotli::CompressorBrotli>().compress(v, vout),
        }.map_err(|source| CompressError { encoding: self, source })
    }
}
impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
impl FromStr for Encoding {
    type Err = UnknownEncoding;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "gzip" | "gz" => Self::Gzip,
            "br" | "brotli" => Self::Brotli,
            _ => return Err(UnknownEncoding(s.into()))
        })
    }
}
impl From<Encoding> for &'static str {
    fn from(e: Encoding) -> Self {
        e.id()
    }
}
impl TryFrom<String> for Encoding {
    type Error = UnknownEncoding;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// An error for encoding identifiers that are not supported.
#[derive(Debug, thiserror::Error)]
#[error("unknown encoding: {0}")]
pub struct UnknownEncoding(pub Box<str>);
