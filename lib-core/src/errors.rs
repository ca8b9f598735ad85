use std::{error::Error, fmt::Display, io, sync::Arc};

use crate::compress::Encoding;

/// A fatal error that aborts a pipeline run. The manifest is never saved after one of these.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Writing an output (artifact or manifest) to storage failed.
    #[error("failed to write {name}: {source}")]
    StorageWrite {
        /// Name of the stored object.
        name: Box<str>,
        /// Underlying storage error.
        #[source]
        source: io::Error
    },
    /// Reading from storage failed for a reason other than a missing object.
    #[error("failed to read {name}: {source}")]
    StorageRead {
        /// Name of the stored object.
        name: Box<str>,
        /// Underlying storage error.
        #[source]
        source: io::Error
    },
    /// The prior manifest exists but cannot be understood.
    #[error("manifest {name} is corrupt: {reason}")]
    ManifestCorrupt {
        /// Name of the manifest object.
        name: Box<str>,
        /// Why parsing failed.
        reason: String
    },
    /// The same logical name was provided twice in one run.
    #[error("duplicate asset: {0}")]
    DuplicateAsset(Box<str>),
    /// The asset provider failed to list assets.
    #[error("failed to list assets: {0}")]
    Provider(#[source] io::Error),
    /// The run was cancelled before the manifest was saved.
    #[error("run cancelled")]
    Cancelled,
    /// The worker pool could not be created or a worker disappeared.
    #[error("worker pool failure: {0}")]
    WorkerPool(String),
}

/// An error returned by a minifier. Never fatal: the unminified content is used instead.
#[derive(Debug, thiserror::Error)]
pub enum MinifyError {
    /// Content is not valid UTF-8.
    #[error("content is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),
    /// The minifier could not parse the content.
    #[error("parse error: {0}")]
    Parse(String),
    /// The minifier could not print its result.
    #[error("print error: {0}")]
    Print(String),
    /// JSON (de)serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// An error returned by a compressor. Never fatal: only this encoding is skipped.
#[derive(Debug, thiserror::Error)]
#[error("{encoding} compression failed")]
pub struct CompressError {
    /// Encoding that failed.
    pub encoding: Encoding,
    /// Underlying error.
    #[source]
    pub source: io::Error
}

/// A local reference in a style sheet that does not point to any asset of the run.
/// The reference is kept as written.
#[derive(Debug, thiserror::Error)]
#[error("unresolved reference {url}")]
pub struct ReferenceError {
    /// The reference as written in the style sheet.
    pub url: Box<str>
}

/// A struct for collecting per-asset warnings.
pub struct ErrorCollector {
    silent: bool,
    vec: Vec<AssetWarning>,
}
impl ErrorCollector {
    /// Creates a new `ErrorCollector` with a `silent` option.
    #[must_use]
    pub const fn new(silent: bool) -> Self { Self { silent, vec: Vec::new() } }

    /// Collects a warning for an asset based on its logical name.
    pub fn collect(&mut self, name: impl Into<Arc<str>>, kind: WarningKind) {
        if !self.silent {
            self.vec.push(AssetWarning { name: name.into(), kind });
        }
    }

    /// Returns all currently gathered warnings.
    #[must_use]
    pub fn results(&self) -> &[AssetWarning] {
        &self.vec
    }

    /// Consumes the collector and returns warnings sorted by asset name.
    #[must_use]
    pub fn into_sorted(mut self) -> Vec<AssetWarning> {
        self.vec.sort_by(|a, b| a.name.cmp(&b.name));
        self.vec
    }
}

/// What went wrong for a single asset.
#[derive(Debug)]
pub enum WarningKind {
    /// Minification failed; the raw content was used.
    Minify(MinifyError),
    /// Compression failed; the encoding was skipped.
    Compress(CompressError),
    /// A style sheet reference was left unchanged.
    Reference(ReferenceError),
}

/// A non-fatal problem found while an asset was processed.
#[derive(Debug)]
pub struct AssetWarning {
    /// Logical name of the asset.
    pub name: Arc<str>,
    /// Kind of the problem with its cause.
    pub kind: WarningKind
}
impl AssetWarning {
    /// Returns the inner error.
    #[must_use]
    pub fn inner_error(&self) -> &(dyn Error + 'static) {
        match &self.kind {
            WarningKind::Minify(e) => e,
            WarningKind::Compress(e) => e,
            WarningKind::Reference(e) => e,
        }
    }
}
impl Error for AssetWarning {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner_error())
    }
}
impl Display for AssetWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            WarningKind::Minify(e) => write!(f, "{}: minification skipped: {}", self.name, e),
            WarningKind::Compress(e) => write!(f, "{}: {}: {}", self.name, e, e.source),
            WarningKind::Reference(e) => write!(f, "{}: {}", self.name, e),
        }
    }
}
