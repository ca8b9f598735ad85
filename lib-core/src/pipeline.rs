use std::{collections::{BTreeMap, BTreeSet, HashMap, HashSet}, fmt, sync::{atomic::{AtomicBool, Ordering}, Arc}, thread};

use bytes::Bytes;
use crossbeam_channel::{bounded, Sender};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    asset::{Asset, AssetProvider, CompressedArtifact, ProcessedAsset},
    cfg::ConfigMap,
    classify::{Classifier, ExtensionSet, PolicyOverride, PolicySet},
    compress::{self, Encoding},
    errors::{AssetWarning, CompressError, ErrorCollector, MinifyError, PipelineError, ReferenceError, WarningKind},
    hash,
    manifest::{Manifest, ManifestRecord, DEFAULT_MANIFEST_NAME},
    min::{self, Minifier},
    refs,
    storage::Storage,
    ProgressState,
};

/// Options of a pipeline run.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minify style sheets. Defaults to `true`.
    pub minify_css: bool,
    /// Minify scripts. Defaults to `true`.
    pub minify_js: bool,
    /// Minify JSON files (including source maps and web manifests). Defaults to `true`.
    pub minify_json: bool,
    /// Point `url(...)` and `@import` references of style sheets to hashed names.
    /// Defaults to `true`.
    pub rewrite_css_references: bool,
    /// Encodings to produce. Defaults to GZip and Brotli.
    pub encodings: BTreeSet<Encoding>,
    /// Extensions eligible for compression.
    pub compress_extensions: ExtensionSet,
    /// Extensions never compressed, regardless of other settings.
    pub deny_extensions: HashSet<Box<str>>,
    /// Compress files with unknown extensions (only with [`ExtensionSet::Extend`]). Defaults to `true`.
    pub compress_unknown: bool,
    /// Policies replacing the computed ones for specific extensions.
    pub extension_overrides: BTreeMap<Box<str>, PolicyOverride>,
    /// Store a compressed artifact only if it is strictly smaller than the processed content.
    /// Defaults to `true`.
    pub only_if_smaller: bool,
    /// Content smaller than this (in bytes) is not compressed. Defaults to 0.
    pub min_compress_size: usize,
    /// Number of worker threads. 0 uses one per CPU.
    pub concurrency: usize,
    /// Ignore the prior manifest (also when it is corrupt) and process every asset again.
    pub rebuild: bool,
    /// Name of the manifest object in storage.
    pub manifest_name: Box<str>,
}
impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            minify_css: true,
            minify_js: true,
            minify_json: true,
            rewrite_css_references: true,
            encodings: Encoding::ALL.into(),
            compress_extensions: ExtensionSet::default(),
            deny_extensions: HashSet::new(),
            compress_unknown: true,
            extension_overrides: BTreeMap::new(),
            only_if_smaller: true,
            min_compress_size: 0,
            concurrency: 0,
            rebuild: false,
            manifest_name: DEFAULT_MANIFEST_NAME.into(),
        }
    }
}
impl PipelineConfig {
    fn minifiers(&self) -> impl Iterator<Item = Minifier> {
        [
            (self.minify_css, Minifier::Css),
            (self.minify_js, Minifier::Js),
            (self.minify_json, Minifier::Json),
        ].into_iter().filter_map(|(on, m)| on.then_some(m))
    }
}

/// A phase of a pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    /// Nothing happened yet.
    Init,
    /// Reading the prior manifest.
    LoadingManifest,
    /// Processing assets.
    Processing,
    /// Writing the new manifest.
    SavingManifest,
    /// The run finished successfully.
    Done,
    /// The run was aborted by a fatal error.
    Failed,
}
impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::LoadingManifest => "loading manifest",
            Self::Processing => "processing",
            Self::SavingManifest => "saving manifest",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// A shared flag to cancel a running pipeline.
/// Assets that have not started yet are skipped and the manifest is not saved.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);
impl CancelFlag {
    /// Creates a flag that is not raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Raises the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    /// Checks if the flag is raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A written artifact of an asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactSummary {
    /// Encoding of the artifact (`None` for the primary output).
    pub encoding: Option<Encoding>,
    /// Stored name.
    pub name: Box<str>,
    /// Stored size in bytes.
    pub size: usize,
}

/// Outcome of a single asset.
#[derive(Clone, Debug)]
pub struct AssetSummary {
    /// Logical name.
    pub name: Arc<str>,
    /// Hashed output name.
    pub hashed_name: Box<str>,
    /// Fingerprint inserted in the hashed name.
    pub token: Box<str>,
    /// Size of the raw content.
    pub raw_size: usize,
    /// Outputs written in this run. Empty if the asset was reused.
    pub written: Vec<ArtifactSummary>,
    /// Encodings not stored because they were not smaller than the content.
    pub skipped: Vec<Encoding>,
    /// The asset was unchanged since the prior run and nothing was written.
    pub reused: bool,
}

/// A summary of a successful run.
#[derive(Debug)]
pub struct RunReport {
    /// The manifest that was saved.
    pub manifest: Manifest,
    /// Per-asset outcomes sorted by logical name.
    pub assets: Vec<AssetSummary>,
    /// Non-fatal problems sorted by logical name.
    pub warnings: Vec<AssetWarning>,
    /// Number of assets processed in this run.
    pub processed: usize,
    /// Number of assets reused from the prior run.
    pub reused: usize,
    /// Number of compressed artifacts written.
    pub artifacts_written: usize,
    /// Number of compressed artifacts not stored because they were not smaller.
    pub artifacts_skipped: usize,
}

struct AssetOutcome {
    record: ManifestRecord,
    summary: AssetSummary,
    warnings: Vec<WarningKind>,
}

/// Raw content kept after a minifier failed, with the cause.
struct MinifyFallback {
    raw: Bytes,
    error: MinifyError,
}

/// The pipeline orchestrator. It classifies, minifies, fingerprints, stores and compresses assets,
/// then saves the manifest once all of them are done.
pub struct Pipeline {
    cfg: PipelineConfig,
    cfgmap: ConfigMap,
    classifier: Classifier,
    progress: Option<Sender<ProgressState>>,
    cancel: CancelFlag,
    silent: bool,
}
impl Pipeline {
    /// Creates a pipeline from run options and a configuration map for minifiers and compressors.
    #[must_use]
    pub fn new(cfg: PipelineConfig, cfgmap: ConfigMap) -> Self {
        let mut classifier = Classifier::new(
            cfg.minifiers(),
            cfg.compress_extensions.clone(),
            cfg.deny_extensions.iter().cloned(),
            cfg.compress_unknown
        );
        for (ext, po) in &cfg.extension_overrides {
            if !classifier.set_override(ext, po) {
                warn!(extension = %ext, minifier = %po.minifier, "unknown minifier in extension override, ignoring");
            }
        }
        Self { cfg, cfgmap, classifier, progress: None, cancel: CancelFlag::new(), silent: false }
    }

    /// Sends progress updates through a channel.
    #[must_use]
    pub fn with_progress(mut self, ps: Sender<ProgressState>) -> Self {
        self.progress = Some(ps);
        self
    }

    /// Uses a flag that cancels the run when raised.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Does not collect warnings in the report (they are still logged).
    #[must_use]
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Returns the classifier built from the options.
    #[must_use]
    pub const fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Returns the fingerprint of all options that affect outputs, including the current
    /// minifier and compressor configs. Each run computes it once at the start.
    #[must_use]
    pub fn settings(&self) -> Box<str> {
        settings_fingerprint(&self.cfg, &self.cfgmap)
    }

    /// Runs the pipeline over assets from a provider and stores outputs in `storage`.
    ///
    /// The manifest is written exactly once, after every asset succeeded. Fatal errors leave
    /// any prior manifest untouched; artifacts written before the failure stay in storage
    /// but are only reachable through hashed names.
    /// # Errors
    /// Returns a fatal [`PipelineError`]. Per-asset minification and compression failures are not
    /// fatal and are reported in [`RunReport::warnings`].
    pub fn run(&self, provider: impl AssetProvider, storage: &dyn Storage) -> Result<RunReport, PipelineError> {
        debug!(phase = %RunPhase::Init, "starting run");
        match self.run_phases(provider, storage) {
            Ok(r) => {
                debug!(phase = %RunPhase::Done);
                info!(
                    processed = r.processed,
                    reused = r.reused,
                    written = r.artifacts_written,
                    skipped = r.artifacts_skipped,
                    warnings = r.warnings.len(),
                    "run finished"
                );
                Ok(r)
            }
            Err(e) => {
                debug!(phase = %RunPhase::Failed, error = %e);
                Err(e)
            }
        }
    }

    fn run_phases(&self, provider: impl AssetProvider, storage: &dyn Storage) -> Result<RunReport, PipelineError> {
        let manifest_name = &*self.cfg.manifest_name;
        let settings = self.settings();
        debug!(settings = %settings);

        debug!(phase = %RunPhase::LoadingManifest, manifest = manifest_name);
        let prior = if self.cfg.rebuild {
            Manifest::default()
        } else {
            Manifest::load(storage, manifest_name)?
        };
        let reuse = !self.cfg.rebuild && prior.settings() == Some(&*settings);
        if !prior.is_empty() && !reuse {
            debug!("settings changed since the prior run, processing every asset");
        }

        let mut assets = provider.list_assets().map_err(PipelineError::Provider)?;
        assets.retain(|a| {
            let keep = &*a.name != manifest_name;
            if !keep {
                debug!(asset = %a.name, "skipping the manifest itself");
            }
            keep
        });

        debug!(phase = %RunPhase::Processing, assets = assets.len());
        self.progress(ProgressState::Start(assets.len()));
        let mut manifest = Manifest::new(Some(settings));
        let mut ec = ErrorCollector::new(self.silent);
        let mut summaries: Vec<AssetSummary> = Vec::with_capacity(assets.len());
        let mut resolved = HashMap::new();
        for wave in self.waves(assets) {
            let start = summaries.len();
            self.process_all(&wave, storage, &prior, reuse, &resolved, |out| {
                self.progress(ProgressState::Push(summaries.len(), out.summary.name.clone()));
                for w in out.warnings {
                    ec.collect(out.summary.name.clone(), w);
                }
                manifest.record(&out.summary.name, out.record)?;
                summaries.push(out.summary);
                Ok(())
            })?;
            resolved.extend(summaries[start..].iter().map(|s| (s.name.clone(), s.hashed_name.clone())));
        }
        self.progress(ProgressState::Finish);

        if self.cancel.is_cancelled() {
            return Err(PipelineError::Cancelled)
        }

        debug!(phase = %RunPhase::SavingManifest, manifest = manifest_name, entries = manifest.len());
        manifest.save(storage, manifest_name)?;

        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        let reused = summaries.iter().filter(|s| s.reused).count();
        Ok(RunReport {
            processed: summaries.len() - reused,
            reused,
            artifacts_written: summaries.iter().map(|s| s.written.iter().filter(|a| a.encoding.is_some()).count()).sum(),
            artifacts_skipped: summaries.iter().map(|s| s.skipped.len()).sum(),
            assets: summaries,
            warnings: ec.into_sorted(),
            manifest,
        })
    }

    /// Splits assets into waves, so that every style sheet comes after the assets it refers to.
    /// Style sheets that refer to each other in a cycle share the last wave.
    fn waves(&self, assets: Vec<Asset>) -> Vec<Vec<Asset>> {
        if !self.cfg.rewrite_css_references {
            return vec![assets]
        }
        let names: HashSet<Arc<str>> = assets.iter().map(|a| a.name.clone()).collect();
        let mut pending: Vec<(Asset, Vec<String>)> = assets.into_iter().map(|a| {
            let deps = if refs::is_style_sheet(&a.name) {
                refs::targets(&a.name, &a.content).into_iter()
                    .filter(|t| **t != *a.name && names.contains(&**t))
                    .collect()
            } else {
                Vec::new()
            };
            (a, deps)
        }).collect();
        let mut done: HashSet<Arc<str>> = HashSet::new();
        let mut waves = Vec::new();
        while !pending.is_empty() {
            let (mut ready, mut rest): (Vec<_>, Vec<_>) = pending.into_iter()
                .partition(|(_, deps)| deps.iter().all(|d| done.contains(&**d)));
            if ready.is_empty() {
                debug!(assets = rest.len(), "style sheets refer to each other in a cycle");
                std::mem::swap(&mut ready, &mut rest);
            }
            done.extend(ready.iter().map(|(a, _)| a.name.clone()));
            waves.push(ready.into_iter().map(|(a, _)| a).collect());
            pending = rest;
        }
        waves
    }

    /// Processes assets on a worker pool and hands every outcome to `record` on the calling thread.
    fn process_all(
        &self,
        assets: &[Asset],
        storage: &dyn Storage,
        prior: &Manifest,
        reuse: bool,
        resolved: &HashMap<Arc<str>, Box<str>>,
        mut record: impl FnMut(AssetOutcome) -> Result<(), PipelineError>,
    ) -> Result<(), PipelineError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.cfg.concurrency)
            .build()
            .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;
        let (tx, rx) = bounded::<AssetOutcome>(pool.current_num_threads() * 2);
        thread::scope(|s| {
            let workers = s.spawn(|| pool.install(|| {
                assets.par_iter().try_for_each_with(tx, |tx, a| {
                    if self.cancel.is_cancelled() {
                        return Err(PipelineError::Cancelled)
                    }
                    let out = self.process_asset(a, storage, prior, reuse, resolved)?;
                    tx.send(out).map_err(|_| PipelineError::WorkerPool("recording stopped early".into()))
                })
            }));
            let mut recorded = Ok(());
            for out in &rx {
                if let Err(e) = record(out) {
                    recorded = Err(e);
                    break;
                }
            }
            drop(rx);
            let worked = workers.join().map_err(|_| PipelineError::WorkerPool("worker thread panicked".into()))?;
            recorded.and(worked)
        })
    }

    fn process_asset(
        &self,
        a: &Asset,
        storage: &dyn Storage,
        prior: &Manifest,
        reuse: bool,
        resolved: &HashMap<Arc<str>, Box<str>>,
    ) -> Result<AssetOutcome, PipelineError> {
        let mut warnings = Vec::new();
        let source = self.reference_stage(a, resolved, &mut warnings);
        let source_hash: Box<str> = hash::fingerprint(&source).into();
        if reuse {
            if let Some(rec) = prior.get(&a.name).filter(|rec| is_reusable(rec, &source_hash, storage)) {
                debug!(asset = %a.name, hashed = %rec.hashed_name, "unchanged, reusing stored outputs");
                return Ok(AssetOutcome {
                    summary: AssetSummary {
                        name: a.name.clone(),
                        hashed_name: rec.hashed_name.clone(),
                        token: hash::token_of(&a.name, &rec.hashed_name).unwrap_or_default().into(),
                        raw_size: a.content.len(),
                        written: Vec::new(),
                        skipped: Vec::new(),
                        reused: true,
                    },
                    record: rec.clone(),
                    warnings,
                })
            }
        }

        let policy = self.classifier.classify(&a.name);
        let content = match self.minify_stage(source, policy) {
            Ok(b) => b,
            Err(MinifyFallback { raw, error }) => {
                warn!(asset = %a.name, error = %error, "minification failed, using original content");
                warnings.push(WarningKind::Minify(error));
                raw
            }
        };

        let token = hash::fingerprint(&content);
        let hashed_name: Box<str> = hash::hashed_name(&a.name, &token).into();
        let pa = ProcessedAsset { name: a.name.clone(), content, token: token.into(), hashed_name };
        write(storage, &pa.hashed_name, &pa.content)?;
        let mut written = vec![ArtifactSummary { encoding: None, name: pa.hashed_name.clone(), size: pa.content.len() }];

        let mut encodings = BTreeSet::new();
        let mut skipped = Vec::new();
        if policy.compress && pa.content.len() >= self.cfg.min_compress_size {
            for &e in &self.cfg.encodings {
                let art = match self.compress_stage(&pa, e) {
                    Ok(art) => art,
                    Err(err) => {
                        warn!(asset = %a.name, encoding = %e, error = %err.source, "compression failed, skipping encoding");
                        warnings.push(WarningKind::Compress(err));
                        continue;
                    }
                };
                if self.cfg.only_if_smaller && art.content.len() >= pa.content.len() {
                    debug!(asset = %a.name, encoding = %e, size = art.content.len(), original = pa.content.len(), "compressed output is not smaller, skipping");
                    skipped.push(e);
                    continue;
                }
                write(storage, &art.name, &art.content)?;
                written.push(ArtifactSummary { encoding: Some(e), name: art.name, size: art.content.len() });
                encodings.insert(e);
            }
        }
        debug!(asset = %a.name, hashed = %pa.hashed_name, encodings = ?encodings, "processed");

        Ok(AssetOutcome {
            record: ManifestRecord { hashed_name: pa.hashed_name.clone(), encodings, source_hash: Some(source_hash) },
            summary: AssetSummary {
                name: pa.name,
                hashed_name: pa.hashed_name,
                token: pa.token,
                raw_size: a.content.len(),
                written,
                skipped,
                reused: false,
            },
            warnings,
        })
    }

    /// Points local references of a style sheet to the hashed names resolved so far.
    fn reference_stage(&self, a: &Asset, resolved: &HashMap<Arc<str>, Box<str>>, warnings: &mut Vec<WarningKind>) -> Bytes {
        if !self.cfg.rewrite_css_references || !refs::is_style_sheet(&a.name) {
            return a.content.clone()
        }
        match refs::rewrite(&a.name, &a.content, |t| resolved.get(t).map(|h| &**h)) {
            Ok(rw) => {
                for url in rw.unresolved {
                    warn!(asset = %a.name, url = %url, "unresolved reference, keeping it as written");
                    warnings.push(WarningKind::Reference(ReferenceError { url }));
                }
                rw.content.map_or_else(|| a.content.clone(), Bytes::from)
            }
            Err(e) => {
                debug!(asset = %a.name, error = %e, "cannot read references, keeping content");
                a.content.clone()
            }
        }
    }

    fn minify_stage(&self, source: Bytes, policy: PolicySet) -> Result<Bytes, MinifyFallback> {
        let Some(m) = policy.minifier else {
            return Ok(source)
        };
        let mut v = Vec::with_capacity(source.len());
        match m.minify(&self.cfgmap, &source, &mut v) {
            Ok(()) => Ok(v.into()),
            Err(error) => Err(MinifyFallback { raw: source, error })
        }
    }

    fn compress_stage(&self, pa: &ProcessedAsset, e: Encoding) -> Result<CompressedArtifact, CompressError> {
        let mut v = Vec::with_capacity(pa.content.len() / 2);
        e.compress(&self.cfgmap, &pa.content, &mut v)?;
        Ok(CompressedArtifact { encoding: e, name: e.artifact_name(&pa.hashed_name).into(), content: v.into() })
    }

    fn progress(&self, st: ProgressState) {
        if let Some(ps) = &self.progress {
            if ps.send(st).is_err() {
                debug!("progress receiver closed");
            }
        }
    }
}

fn is_reusable(rec: &ManifestRecord, source_hash: &str, storage: &dyn Storage) -> bool {
    rec.source_hash.as_deref() == Some(source_hash)
        && storage.exists(&rec.hashed_name)
        && rec.encodings.iter().all(|e| storage.exists(&e.artifact_name(&rec.hashed_name)))
}

fn write(storage: &dyn Storage, name: &str, data: &[u8]) -> Result<(), PipelineError> {
    storage.write(name, data).map_err(|source| PipelineError::StorageWrite { name: name.into(), source })
}

/// Computes a fingerprint of every option that changes stored outputs.
fn settings_fingerprint(cfg: &PipelineConfig, cfgmap: &ConfigMap) -> Box<str> {
    #[derive(serde::Serialize)]
    struct Key<'a> {
        version: &'static str,
        minifiers: Vec<&'static str>,
        rewrite_css_references: bool,
        encodings: &'a BTreeSet<Encoding>,
        compress_override: bool,
        compress_extensions: Vec<&'a str>,
        deny_extensions: Vec<&'a str>,
        compress_unknown: bool,
        extension_overrides: &'a BTreeMap<Box<str>, PolicyOverride>,
        only_if_smaller: bool,
        min_compress_size: usize,
        css: &'a min::css::CSSConfig,
        js: &'a min::js::JSConfig,
        json: &'a min::json::JSONConfig,
        gzip: &'a compress::gzip::GzipConfig,
        brotli: &'a compress::brotli::BrotliConfig,
    }
    fn sorted(s: &HashSet<Box<str>>) -> Vec<&str> {
        let mut v: Vec<_> = s.iter().map(|x| &**x).collect();
        v.sort_unstable();
        v
    }
    let (compress_override, exts) = match &cfg.compress_extensions {
        ExtensionSet::Extend(x) => (false, x),
        ExtensionSet::Override(x) => (true, x),
    };
    let css = cfgmap.fetch::<min::css::MinifierCSS>();
    let js = cfgmap.fetch::<min::js::MinifierJS>();
    let json = cfgmap.fetch::<min::json::MinifierJSON>();
    let gzip = cfgmap.fetch::<compress::gzip::CompressorGzip>();
    let brotli = cfgmap.fetch::<compress::brotli::CompressorBrotli>();
    let key = Key {
        version: env!("CARGO_PKG_VERSION"),
        minifiers: cfg.minifiers().map(Minifier::name).collect(),
        rewrite_css_references: cfg.rewrite_css_references,
        encodings: &cfg.encodings,
        compress_override,
        compress_extensions: sorted(exts),
        deny_extensions: sorted(&cfg.deny_extensions),
        compress_unknown: cfg.compress_unknown,
        extension_overrides: &cfg.extension_overrides,
        only_if_smaller: cfg.only_if_smaller,
        min_compress_size: cfg.min_compress_size,
        css: &css,
        js: &js,
        json: &json,
        gzip: &gzip,
        brotli: &brotli,
    };
    hash::fingerprint(&serde_json::to_vec(&key).unwrap_or_default()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_options() {
        let a = Pipeline::new(PipelineConfig::default(), ConfigMap::default());
        let b = Pipeline::new(PipelineConfig::default(), ConfigMap::default());
        assert_eq!(a.settings(), b.settings());
        let c = Pipeline::new(PipelineConfig { only_if_smaller: false, ..PipelineConfig::default() }, ConfigMap::default());
        assert_ne!(a.settings(), c.settings());
        let cm = ConfigMap::default();
        cm.set::<compress::brotli::CompressorBrotli>(compress::brotli::BrotliConfig { quality: 5, lgwin: 22 });
        let d = Pipeline::new(PipelineConfig::default(), cm);
        assert_ne!(a.settings(), d.settings());
    }

    #[test]
    fn settings_see_configs_set_after_creation() {
        let cm = ConfigMap::default();
        let p = Pipeline::new(PipelineConfig::default(), cm.clone());
        let before = p.settings();
        cm.set::<min::css::MinifierCSS>(min::css::CSSConfig { optimize: false });
        assert_ne!(p.settings(), before);
    }

    #[test]
    fn settings_ignore_set_order() {
        let exts = |v: &[&str]| PipelineConfig {
            deny_extensions: v.iter().map(|&x| x.into()).collect(),
            ..PipelineConfig::default()
        };
        let a = Pipeline::new(exts(&["a", "b", "c", "d"]), ConfigMap::default());
        let b = Pipeline::new(exts(&["d", "c", "b", "a"]), ConfigMap::default());
        assert_eq!(a.settings(), b.settings());
    }

    #[test]
    fn disabled_minifiers_are_not_classified() {
        let p = Pipeline::new(PipelineConfig { minify_js: false, ..PipelineConfig::default() }, ConfigMap::default());
        assert_eq!(p.classifier().classify("a.js").minifier, None);
        assert_eq!(p.classifier().classify("a.css").minifier, Some(Minifier::Css));
    }

    #[test]
    fn style_sheets_wait_for_their_references() {
        let p = Pipeline::new(PipelineConfig::default(), ConfigMap::default());
        let assets = vec![
            Asset::new("css/app.css", &b"@import \"theme.css\";"[..]),
            Asset::new("css/theme.css", &b".a { background: url(../img/a.png) }"[..]),
            Asset::new("img/a.png", &b"png"[..]),
            Asset::new("css/plain.css", &b"a { color: red }"[..]),
        ];
        fn names(w: &[Asset]) -> Vec<&str> { w.iter().map(|a| &*a.name).collect() }
        let waves = p.waves(assets.clone());
        assert_eq!(waves.len(), 3);
        assert_eq!(names(&waves[0]), ["img/a.png", "css/plain.css"]);
        assert_eq!(names(&waves[1]), ["css/theme.css"]);
        assert_eq!(names(&waves[2]), ["css/app.css"]);

        let p = Pipeline::new(PipelineConfig { rewrite_css_references: false, ..PipelineConfig::default() }, ConfigMap::default());
        assert_eq!(p.waves(assets).len(), 1);
    }

    #[test]
    fn cancel_flag_is_shared() {
        let f = CancelFlag::new();
        let g = f.clone();
        assert!(!g.is_cancelled());
        f.cancel();
        assert!(g.is_cancelled());
    }
}
