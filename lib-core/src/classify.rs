use std::collections::{HashMap, HashSet};

use crate::{ext::{self, KnownFmt}, min::Minifier};

/// Extensions eligible for compression when [`ExtensionSet::Extend`] is used.
pub const DEFAULT_COMPRESS_EXTENSIONS: &[&str] = &[
    "css", "js", "mjs", "html", "htm", "txt", "json", "map", "webmanifest", "svg", "xml"
];

/// Processing policy of a single asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolicySet {
    /// A minifier applied before hashing, if any.
    pub minifier: Option<Minifier>,
    /// Whether compressors apply at all.
    pub compress: bool,
}

/// A set of extensions eligible for compression.
/// It has built-in extensions (if [`ExtensionSet::Extend`] is used): see [`DEFAULT_COMPRESS_EXTENSIONS`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionSet {
    /// Extend the built-in list with more extensions.
    Extend(HashSet<Box<str>>),
    /// Override the built-in list. Only the given extensions are compressed.
    Override(HashSet<Box<str>>)
}
impl Default for ExtensionSet {
    fn default() -> Self {
        Self::Extend(HashSet::new())
    }
}
impl ExtensionSet {
    fn lowercased(self) -> Self {
        let lc = |x: HashSet<Box<str>>| x.into_iter().map(|e| e.to_ascii_lowercase().into()).collect();
        match self {
            Self::Extend(x) => Self::Extend(lc(x)),
            Self::Override(x) => Self::Override(lc(x))
        }
    }

    fn contains(&self, ext: &str) -> bool {
        match self {
            Self::Extend(x) => DEFAULT_COMPRESS_EXTENSIONS.contains(&ext) || x.contains(ext),
            Self::Override(x) => x.contains(ext)
        }
    }
}

/// A policy that replaces the computed one for an extension.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PolicyOverride {
    /// Minifier name (`css`, `js`, `json`) or `none`.
    #[serde(default = "none_minifier")]
    pub minifier: Box<str>,
    /// Whether compressors apply.
    #[serde(default = "yes")]
    pub compress: bool,
}

fn none_minifier() -> Box<str> { "none".into() }
const fn yes() -> bool { true }

/// Maps logical names to processing policies.
#[derive(Clone, Debug)]
pub struct Classifier {
    minify: HashSet<Minifier>,
    compress: ExtensionSet,
    deny: HashSet<Box<str>>,
    compress_unknown: bool,
    overrides: HashMap<Box<str>, PolicySet>,
}
impl Default for Classifier {
    fn default() -> Self {
        Self {
            minify: [Minifier::Css, Minifier::Js, Minifier::Json].into(),
            compress: ExtensionSet::default(),
            deny: HashSet::new(),
            compress_unknown: true,
            overrides: HashMap::new(),
        }
    }
}
impl Classifier {
    /// Creates a classifier from a compression extension set, a deny list and minifiers to enable.
    #[must_use]
    pub fn new(
        minify: impl IntoIterator<Item = Minifier>,
        compress: ExtensionSet,
        deny: impl IntoIterator<Item = Box<str>>,
        compress_unknown: bool
    ) -> Self {
        Self {
            minify: minify.into_iter().collect(),
            compress: compress.lowercased(),
            deny: deny.into_iter().map(|e| e.to_ascii_lowercase().into()).collect(),
            compress_unknown,
            overrides: HashMap::new(),
        }
    }

    /// Replaces the policy for an extension.
    /// Returns `false` (and ignores the override) if the minifier name is not known.
    pub fn set_override(&mut self, ext: &str, po: &PolicyOverride) -> bool {
        let minifier = match &*po.minifier {
            "none" | "" => None,
            n => match Minifier::by_name(n) {
                Some(m) => Some(m),
                None => return false
            }
        };
        self.overrides.insert(ext.to_ascii_lowercase().into(), PolicySet { minifier, compress: po.compress });
        true
    }

    /// Returns a processing policy for a logical name.
    #[must_use]
    pub fn classify(&self, name: &str) -> PolicySet {
        let Some(ftype) = ext::extension_of(name) else {
            return PolicySet { minifier: None, compress: self.compress_unknown && matches!(self.compress, ExtensionSet::Extend(_)) }
        };
        let ftype = ftype.to_ascii_lowercase();
        if let Some(p) = self.overrides.get(ftype.as_str()) {
            return *p
        }
        let fmt = KnownFmt::by_extension(&ftype);
        let minifier = Minifier::by_file_format(fmt)
            .filter(|m| self.minify.contains(m) && !is_preminified(name));
        let compress = !self.deny.contains(ftype.as_str()) && (self.compress.contains(&ftype) || match (&self.compress, fmt) {
            (ExtensionSet::Extend(_), f) => self.compress_unknown && !f.is_precompressed(),
            (ExtensionSet::Override(_), _) => false
        });
        PolicySet { minifier, compress }
    }
}

/// Checks if a file stem ends with `.min` (like `jquery.min.js`).
fn is_preminified(name: &str) -> bool {
    let base = name.rsplit('/').next().unwrap_or(name);
    base.rsplit_once('.').is_some_and(|(stem, _)| stem.ends_with(".min"))
}
