//! Static-Repack is initially built as a CLI app, but can also be used as a library.
//! This crate contains everything needed to post-process a set of static web assets
//! before deployment.
//!
//! You should be interested in the `pipeline` module. It drives the whole process:
//! every asset is classified, minified (style sheets and scripts), fingerprinted by its
//! served content, written under a cache-busting name and precompressed (GZip, Brotli).
//! A manifest mapping logical names to hashed names and available encodings is
//! written once at the end of a successful run.
//!
//! Reading input files and storing outputs are abstracted with [`asset::AssetProvider`]
//! and [`storage::Storage`], so the pipeline works the same way for a local directory,
//! an in-memory map or any other backing store.

/// Minifiers for style sheets, scripts and JSON.
pub mod min;
/// Compressors producing alternate encodings (GZip, Brotli).
pub mod compress;
/// Classification of assets into processing policies.
pub mod classify;
/// Known file formats detected by extension.
pub mod ext;
/// References from style sheets to other assets.
pub mod refs;
/// Content fingerprints and cache-busting names.
pub mod hash;
/// Manifest of logical names, hashed names and encodings.
pub mod manifest;
/// Assets and asset providers (file system or memory).
pub mod asset;
/// Storage backends for outputs and the manifest.
pub mod storage;
/// Pipeline orchestrator.
pub mod pipeline;
/// Fatal errors and collected per-asset warnings.
pub mod errors;
/// Implementations of configuration map and traits for accepting config types.
pub mod cfg;

/// A progress state to update information about the currently processed asset
#[derive(Debug, Clone)]
pub enum ProgressState {
    /// Starts a progress with a step count
    Start(usize),
    /// Pushes a new step with text
    Push(usize, std::sync::Arc<str>),
    /// Marks a progress as finished
    Finish
}
