use crate::{cfg, errors::MinifyError, ext::KnownFmt};

/// Minifier for CSS files
pub mod css;

/// Minifier for JavaScript files
pub mod js;

/// Minifier for JSON files
pub mod json;

#[inline]
pub(crate) const fn strip_bom(b: &[u8]) -> &[u8] {
    if let [239, 187, 191, x @ ..] = b { x } else { b }
}

/// A type to determine a minifying method for asset data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Minifier {
    /// A style sheet minifier using `lightningcss`.
    Css,
    /// A script minifier using `oxc`.
    Js,
    /// A JSON minifier using `serde_json`.
    Json,
}
impl Minifier {
    /// Return a Minifier based on known (by this library) file format.
    #[must_use]
    pub const fn by_file_format(f: KnownFmt) -> Option<Self> {
        Some(match f {
            KnownFmt::Css => Self::Css,
            KnownFmt::Js => Self::Js,
            KnownFmt::Json => Self::Json,
            _ => return None
        })
    }

    /// Return a Minifier by its configuration name (`css`, `js`, `json`).
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "css" => Self::Css,
            "js" | "javascript" => Self::Js,
            "json" => Self::Json,
            _ => return None
        })
    }

    /// Returns the configuration name of this minifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
            Self::Json => "json",
        }
    }

    /// Minifies asset data and writes the result in provided vec.
    /// # Errors
    /// Returns an error if minifying fails, depending on asset type
    pub fn minify(&self, cfgmap: &cfg::ConfigMap, v: &[u8], vout: &mut Vec<u8>) -> Result_ {
        let v = std::str::from_utf8(strip_bom(v))?;
        match self {
            Self::Css => cfgmap.fetch::<css::MinifierCSS>().minify(v, vout),
            Self::Js => cfgmap.fetch::<js::MinifierJS>().minify(v, vout),
            Self::Json => cfgmap.fetch::<json::MinifierJSON>().minify(v, vout),
        }
    }
}

type Result_ = Result<(), MinifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minifier_by_format() {
        assert_eq!(Minifier::by_file_format(KnownFmt::Css), Some(Minifier::Css));
        assert_eq!(Minifier::by_file_format(KnownFmt::Js), Some(Minifier::Js));
        assert_eq!(Minifier::by_file_format(KnownFmt::Html), None);
        assert_eq!(Minifier::by_name("JavaScript"), Some(Minifier::Js));
        assert_eq!(Minifier::by_name("none"), None);
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let cm = cfg::ConfigMap::default();
        let mut out = Vec::new();
        let r = Minifier::Css.minify(&cm, &[0xff, 0xfe, b'a', b'{'], &mut out);
        assert!(matches!(r, Err(MinifyError::Utf8(_))));
    }

    #[test]
    fn bom_is_stripped() {
        let cm = cfg::ConfigMap::default();
        let mut out = Vec::new();
        Minifier::Json.minify(&cm, b"\xef\xbb\xbf{ \"a\": 1 }", &mut out).unwrap();
        assert_eq!(out, b"{\"a\":1}");
    }
}
