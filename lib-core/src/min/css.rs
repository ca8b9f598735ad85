use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};

use crate::{cfg::{acfg, ConfigHolder}, errors::MinifyError};

use super::Result_;

acfg!(
    /// A style sheet minifier that accepts [`CSSConfig`].
    MinifierCSS: CSSConfig
);
impl ConfigHolder<MinifierCSS> {
    pub(super) fn minify(&self, source: &str, vout: &mut Vec<u8>) -> Result_ {
        let mut sheet = StyleSheet::parse(source, ParserOptions::default())
            .map_err(|e| MinifyError::Parse(e.to_string()))?;
        if self.optimize {
            sheet.minify(MinifyOptions::default())
                .map_err(|e| MinifyError::Print(e.to_string()))?;
        }
        let res = sheet.to_css(PrinterOptions { minify: true, ..PrinterOptions::default() })
            .map_err(|e| MinifyError::Print(e.to_string()))?;
        vout.extend_from_slice(res.code.as_bytes());
        Ok(())
    }
}

/// Configuration for the style sheet minifier
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CSSConfig {
    /// Merge rules and shorten values in addition to removing whitespace and comments.
    /// Defaults to `true`.
    pub optimize: bool
}
impl Default for CSSConfig {
    fn default() -> Self {
        Self { optimize: true }
    }
}
