//! The manifest is the durable contract of a pipeline run: it maps every logical name to the
//! hashed name that is stored and to the alternate encodings available for it.
//!
//! It is serialized as JSON with a `version` field. Paths are kept in a sorted map and
//! encodings in a sorted set, so the same inputs always produce byte-identical manifests.

use std::collections::{BTreeMap, BTreeSet};

use crate::{compress::Encoding, errors::PipelineError, storage::Storage};

/// Current version of the manifest format.
pub const MANIFEST_VERSION: u32 = 1;

/// Default name of the manifest object.
pub const DEFAULT_MANIFEST_NAME: &str = "staticfiles.json";

/// Stored outputs of a single asset.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ManifestRecord {
    /// Name of the primary (identity-encoded) output.
    pub hashed_name: Box<str>,
    /// Encodings stored next to the primary output, as `{hashed_name}{suffix}`.
    #[serde(default)]
    pub encodings: BTreeSet<Encoding>,
    /// Fingerprint of the unminified content (with style sheet references already pointed to
    /// hashed names), used to skip unchanged assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<Box<str>>,
}

#[derive(serde::Deserialize)]
struct ManifestDoc {
    version: u32,
    #[serde(default)]
    settings: Option<Box<str>>,
    #[serde(default)]
    paths: BTreeMap<Box<str>, ManifestRecord>,
}

/// A mapping from logical names to stored outputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    settings: Option<Box<str>>,
    paths: BTreeMap<Box<str>, ManifestRecord>,
}
impl Manifest {
    /// Creates an empty manifest tagged with a settings fingerprint.
    #[must_use]
    pub fn new(settings: Option<Box<str>>) -> Self {
        Self { settings, paths: BTreeMap::new() }
    }

    /// Reads a manifest from storage. A missing manifest is read as an empty one.
    /// # Errors
    /// Returns [`PipelineError::StorageRead`] if storage fails and
    /// [`PipelineError::ManifestCorrupt`] if the manifest cannot be parsed.
    pub fn load(storage: &dyn Storage, name: &str) -> Result<Self, PipelineError> {
        let Some(b) = storage.read(name).map_err(|source| PipelineError::StorageRead { name: name.into(), source })? else {
            return Ok(Self::default())
        };
        let doc: ManifestDoc = serde_json::from_slice(&b).map_err(|e| PipelineError::ManifestCorrupt {
            name: name.into(),
            reason: e.to_string()
        })?;
        if doc.version != MANIFEST_VERSION {
            return Err(PipelineError::ManifestCorrupt {
                name: name.into(),
                reason: format!("unsupported version {}", doc.version)
            })
        }
        Ok(Self { settings: doc.settings, paths: doc.paths })
    }

    /// Records outputs of an asset.
    /// # Errors
    /// Returns [`PipelineError::DuplicateAsset`] if the logical name is already recorded.
    pub fn record(&mut self, name: &str, record: ManifestRecord) -> Result<(), PipelineError> {
        if self.paths.contains_key(name) {
            return Err(PipelineError::DuplicateAsset(name.into()))
        }
        self.paths.insert(name.into(), record);
        Ok(())
    }

    /// Serializes the manifest and writes it as a single object.
    /// # Errors
    /// Returns [`PipelineError::StorageWrite`] if storage fails.
    pub fn save(&self, storage: &dyn Storage, name: &str) -> Result<(), PipelineError> {
        let v = self.to_vec();
        storage.write(name, &v).map_err(|source| PipelineError::StorageWrite { name: name.into(), source })
    }

    /// Returns the serialized form of the manifest.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let doc = ManifestDocRef { version: MANIFEST_VERSION, settings: self.settings.as_deref(), paths: &self.paths };
        // Serializing plain maps and strings cannot fail.
        let mut v = serde_json::to_vec_pretty(&doc).unwrap_or_default();
        v.push(b'\n');
        v
    }

    /// Returns the record of a logical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ManifestRecord> {
        self.paths.get(name)
    }

    /// Returns the stored name that should be served for a logical name,
    /// given the encodings a client accepts (Brotli is preferred over GZip).
    #[must_use]
    pub fn resolve(&self, name: &str, accepted: &[Encoding]) -> Option<(String, Option<Encoding>)> {
        let rec = self.paths.get(name)?;
        for e in Encoding::ALL {
            if rec.encodings.contains(&e) && accepted.contains(&e) {
                return Some((e.artifact_name(&rec.hashed_name), Some(e)))
            }
        }
        Some((rec.hashed_name.to_string(), None))
    }

    /// Returns the settings fingerprint the manifest was written with.
    #[must_use]
    pub fn settings(&self) -> Option<&str> {
        self.settings.as_deref()
    }

    /// Iterates over records in logical name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestRecord)> {
        self.paths.iter().map(|(k, v)| (&**k, v))
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Checks if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[derive(serde::Serialize)]
struct ManifestDocRef<'a> {
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<&'a str>,
    paths: &'a BTreeMap<Box<str>, ManifestRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn rec(h: &str, enc: &[Encoding]) -> ManifestRecord {
        ManifestRecord { hashed_name: h.into(), encodings: enc.iter().copied().collect(), source_hash: None }
    }

    #[test]
    fn missing_manifest_is_empty() {
        let st = MemoryStorage::new();
        let m = Manifest::load(&st, DEFAULT_MANIFEST_NAME).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.settings(), None);
    }

    #[test]
    fn save_then_load() {
        let st = MemoryStorage::new();
        let mut m = Manifest::new(Some("abc".into()));
        m.record("css/app.css", rec("css/app.1.css", &[Encoding::Gzip, Encoding::Brotli])).unwrap();
        m.record("a.js", rec("a.2.js", &[])).unwrap();
        m.save(&st, "m.json").unwrap();
        let loaded = Manifest::load(&st, "m.json").unwrap();
        assert_eq!(loaded, m);
        assert_eq!(loaded.iter().map(|(k, _)| k).collect::<Vec<_>>(), ["a.js", "css/app.css"]);
    }

    #[test]
    fn serialized_shape() {
        let mut m = Manifest::new(None);
        m.record("app.css", rec("app.h1.css", &[Encoding::Gzip])).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&m.to_vec()).unwrap();
        assert_eq!(v, serde_json::json!({
            "version": 1,
            "paths": { "app.css": { "hashed_name": "app.h1.css", "encodings": ["gzip"] } }
        }));
    }

    #[test]
    fn duplicate_is_rejected() {
        let mut m = Manifest::new(None);
        m.record("a.css", rec("a.1.css", &[])).unwrap();
        let e = m.record("a.css", rec("a.2.css", &[])).unwrap_err();
        assert!(matches!(e, PipelineError::DuplicateAsset(n) if &*n == "a.css"));
        assert_eq!(&*m.get("a.css").unwrap().hashed_name, "a.1.css");
    }

    #[test]
    fn corrupt_and_unknown_versions() {
        let st = MemoryStorage::new();
        st.write("m.json", b"{not json").unwrap();
        assert!(matches!(Manifest::load(&st, "m.json"), Err(PipelineError::ManifestCorrupt { .. })));
        st.write("m.json", br#"{"version": 9, "paths": {}}"#).unwrap();
        assert!(matches!(Manifest::load(&st, "m.json"), Err(PipelineError::ManifestCorrupt { .. })));
    }

    #[test]
    fn resolve_prefers_brotli() {
        let mut m = Manifest::new(None);
        m.record("app.css", rec("app.h.css", &[Encoding::Gzip, Encoding::Brotli])).unwrap();
        m.record("logo.png", rec("logo.h.png", &[])).unwrap();
        assert_eq!(m.resolve("app.css", &[Encoding::Gzip, Encoding::Brotli]), Some(("app.h.css.br".into(), Some(Encoding::Brotli))));
        assert_eq!(m.resolve("app.css", &[Encoding::Gzip]), Some(("app.h.css.gz".into(), Some(Encoding::Gzip))));
        assert_eq!(m.resolve("app.css", &[]), Some(("app.h.css".into(), None)));
        assert_eq!(m.resolve("logo.png", &[Encoding::Gzip]), Some(("logo.h.png".into(), None)));
        assert_eq!(m.resolve("missing.css", &[]), None);
    }
}
