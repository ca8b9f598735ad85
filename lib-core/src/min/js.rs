use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::{cfg::{acfg, ConfigHolder}, errors::MinifyError};

use super::Result_;

acfg!(
    /// A script minifier that accepts [`JSConfig`].
    MinifierJS: JSConfig
);
impl ConfigHolder<MinifierJS> {
    pub(super) fn minify(&self, source: &str, vout: &mut Vec<u8>) -> Result_ {
        let allocator = Allocator::default();
        // resolved to a module only if the source uses import/export,
        // so top-level names of classic scripts stay global and are never dropped
        let ret = Parser::new(&allocator, source, SourceType::unambiguous()).parse();
        if let Some(e) = ret.errors.first() {
            return Err(MinifyError::Parse(e.to_string()));
        }
        let mut program = ret.program;
        let options = MinifierOptions {
            mangle: self.mangle.then(MangleOptions::default),
            compress: self.compress.then(CompressOptions::smallest),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);
        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code;
        vout.extend_from_slice(code.as_bytes());
        Ok(())
    }
}

/// Configuration for the script minifier
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct JSConfig {
    /// Shorten local identifiers. Defaults to `true`.
    pub mangle: bool,
    /// Apply compressing transforms (dead code removal, constant folding). Defaults to `true`.
    pub compress: bool,
}
impl Default for JSConfig {
    fn default() -> Self {
        Self { mangle: true, compress: true }
    }
}

#[cfg(test)]
mod tests {
    use crate::{cfg::ConfigMap, errors::MinifyError, min::Minifier};

    const SRC: &str = "// greeting\nexport function greet(name) {\n    const message = 'Hello, ' + name;\n    return message;\n}\n";

    #[test]
    fn shrinks_and_is_deterministic() {
        let cm = ConfigMap::default();
        let (mut a, mut b) = (Vec::new(), Vec::new());
        Minifier::Js.minify(&cm, SRC.as_bytes(), &mut a).unwrap();
        Minifier::Js.minify(&cm, SRC.as_bytes(), &mut b).unwrap();
        assert!(!a.is_empty());
        assert!(a.len() < SRC.len());
        assert_eq!(a, b);
        assert!(!String::from_utf8(a).unwrap().contains("greeting"));
    }

    #[test]
    fn classic_scripts_keep_top_level_names() {
        let src = "function greet(name) {\n  return 'Hello, ' + name;\n}\nvar counter = 0;\n";
        let mut out = Vec::new();
        Minifier::Js.minify(&ConfigMap::default(), src.as_bytes(), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("function greet("), "{out}");
        assert!(out.contains("counter"), "{out}");
        assert!(out.len() < src.len());
    }

    #[test]
    fn modules_keep_exports() {
        let mut out = Vec::new();
        Minifier::Js.minify(&ConfigMap::default(), SRC.as_bytes(), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("greet"));
    }

    #[test]
    fn syntax_error_is_reported() {
        let mut out = Vec::new();
        let r = Minifier::Js.minify(&ConfigMap::default(), b"function (", &mut out);
        assert!(matches!(r, Err(MinifyError::Parse(_))));
    }
}
