use json_comments::StripComments;
use serde_json::Value;

use crate::cfg::{acfg, ConfigHolder};

use super::Result_;

acfg!(
    /// A JSON minifier that accepts [`JSONConfig`].
    MinifierJSON: JSONConfig
);
impl ConfigHolder<MinifierJSON> {
    pub(super) fn minify(&self, source: &str, vout: &mut Vec<u8>) -> Result_ {
        let sv: Value = if self.strip_comments {
            serde_json::from_reader(StripComments::new(source.as_bytes()))?
        } else {
            serde_json::from_str(source)?
        };
        serde_json::to_writer(vout, &sv)?;
        Ok(())
    }
}

/// Configuration for JSON minifier
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct JSONConfig {
    /// An optional flag that enables removing `//` and `/* */` comments before parsing.
    /// Defaults to `true`.
    pub strip_comments: bool
}
impl Default for JSONConfig {
    fn default() -> Self {
        Self { strip_comments: true }
    }
}

#[cfg(test)]
mod tests {
    use crate::{cfg::ConfigMap, errors::MinifyError, min::Minifier};

    #[test]
    fn keeps_key_order() {
        let mut out = Vec::new();
        Minifier::Json.minify(&ConfigMap::default(), b"{\n  \"z\": 1, // last\n  \"a\": [1, 2]\n}", &mut out).unwrap();
        assert_eq!(out, br#"{"z":1,"a":[1,2]}"#);
    }

    #[test]
    fn comments_rejected_when_not_stripped() {
        let cm = ConfigMap::default();
        cm.set::<super::MinifierJSON>(super::JSONConfig { strip_comments: false });
        let mut out = Vec::new();
        let r = Minifier::Json.minify(&cm, b"{\"a\": 1 /* c */}", &mut out);
        assert!(matches!(r, Err(MinifyError::Json(_))));
    }
}
