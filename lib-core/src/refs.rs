//! References from style sheets to other assets.
//!
//! `url(...)` values and `@import` rules pointing to local files are rewritten to the hashed
//! names of those files, so a style sheet still finds its images, fonts and imports after they
//! get cache-busting names. External URLs, `data:` URIs, absolute paths and bare fragments
//! are never touched. Query strings and fragments are kept.

use std::convert::Infallible;

use lightningcss::{
    rules::CssRule,
    stylesheet::{ParserOptions, PrinterOptions, StyleSheet},
    values::url::Url,
    visit_types,
    visitor::{Visit, VisitTypes, Visitor},
};

use crate::{errors::MinifyError, ext::{extension_of, KnownFmt}, min::strip_bom};

/// Replaces every reference for which the function returns a new value.
struct References<F>(F);
impl<'i, F: FnMut(&str) -> Option<String>> Visitor<'i> for References<F> {
    type Error = Infallible;

    fn visit_types(&self) -> VisitTypes {
        visit_types!(URLS | RULES)
    }

    fn visit_url(&mut self, url: &mut Url<'i>) -> Result<(), Self::Error> {
        if let Some(new) = (self.0)(&*url.url) {
            url.url = new.into();
        }
        Ok(())
    }

    fn visit_rule(&mut self, rule: &mut CssRule<'i>) -> Result<(), Self::Error> {
        // import targets are plain strings, not urls
        if let CssRule::Import(import) = rule {
            if let Some(new) = (self.0)(&*import.url) {
                import.url = new.into();
            }
        }
        rule.visit_children(self)
    }
}

/// A style sheet after its references were pointed to hashed names.
#[derive(Debug, Default)]
pub struct Rewritten {
    /// The printed style sheet, or `None` if no reference changed.
    pub content: Option<String>,
    /// Local references (as written) that did not match any known asset.
    pub unresolved: Vec<Box<str>>,
}

/// Checks if a logical name is a style sheet whose references can be rewritten.
#[must_use]
pub fn is_style_sheet(name: &str) -> bool {
    extension_of(name).map(KnownFmt::by_extension) == Some(KnownFmt::Css)
}

/// Resolves a reference found in the style sheet `from` to the logical name it points to.
/// Returns `None` for references that are not local to the asset tree.
#[must_use]
pub fn resolve(from: &str, url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    if path.is_empty() || path.starts_with('/') || has_scheme(path) {
        return None
    }
    let mut segs: Vec<&str> = from.rsplit_once('/').map_or_else(Vec::new, |(dir, _)| dir.split('/').collect());
    for s in path.split('/') {
        match s {
            "" | "." => {}
            ".." => { segs.pop()?; }
            s => segs.push(s),
        }
    }
    (!segs.is_empty()).then(|| segs.join("/"))
}

fn has_scheme(path: &str) -> bool {
    path.split_once(':').is_some_and(|(s, _)| {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
    })
}

/// Puts the last segment of `hashed` in place of the last path segment of `url`.
fn with_hashed_base(url: &str, hashed: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let (path, suffix) = url.split_at(end);
    let dir = path.rfind('/').map_or("", |i| &path[..=i]);
    let base = hashed.rsplit('/').next().unwrap_or(hashed);
    [dir, base, suffix].concat()
}

/// Lists logical names of the local assets a style sheet refers to.
/// Content that cannot be parsed refers to nothing.
#[must_use]
pub fn targets(from: &str, source: &[u8]) -> Vec<String> {
    let Ok(source) = std::str::from_utf8(strip_bom(source)) else {
        return Vec::new()
    };
    let Ok(mut sheet) = StyleSheet::parse(source, ParserOptions::default()) else {
        return Vec::new()
    };
    let mut found = Vec::new();
    let Ok(()) = sheet.visit(&mut References(|url: &str| {
        found.extend(resolve(from, url));
        None
    }));
    found
}

/// Rewrites local references of the style sheet `from`.
/// `lookup` returns the hashed name of a logical name, if that asset is known.
/// # Errors
/// Returns an error if the content is not valid UTF-8, or cannot be parsed or printed.
pub fn rewrite<'a>(from: &str, source: &[u8], lookup: impl Fn(&str) -> Option<&'a str>) -> Result<Rewritten, MinifyError> {
    let source = std::str::from_utf8(strip_bom(source))?;
    let mut sheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| MinifyError::Parse(e.to_string()))?;
    let mut changed = false;
    let mut unresolved: Vec<Box<str>> = Vec::new();
    let Ok(()) = sheet.visit(&mut References(|url: &str| {
        let target = resolve(from, url)?;
        if let Some(hashed) = lookup(&target) {
            changed = true;
            return Some(with_hashed_base(url, hashed))
        }
        if !unresolved.iter().any(|u| &**u == url) {
            unresolved.push(url.into());
        }
        None
    }));
    if !changed {
        return Ok(Rewritten { content: None, unresolved })
    }
    let res = sheet.to_css(PrinterOptions::default())
        .map_err(|e| MinifyError::Print(e.to_string()))?;
    Ok(Rewritten { content: Some(res.code), unresolved })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<&'static str> {
        match name {
            "img/logo.png" => Some("img/logo.0123456789ab.png"),
            "fonts/a.woff2" => Some("fonts/a.ba9876543210.woff2"),
            "css/base.css" => Some("css/base.aaaaaaaaaaaa.css"),
            _ => None
        }
    }

    #[test]
    fn resolves_relative_paths() {
        assert_eq!(resolve("css/app.css", "../img/logo.png").as_deref(), Some("img/logo.png"));
        assert_eq!(resolve("css/app.css", "./base.css?v=2").as_deref(), Some("css/base.css"));
        assert_eq!(resolve("app.css", "img/logo.png#x").as_deref(), Some("img/logo.png"));
        assert_eq!(resolve("app.css", "../logo.png"), None);
    }

    #[test]
    fn skips_non_local_references() {
        for url in ["https://cdn.example.com/a.png", "//cdn.example.com/a.png", "/static/a.png", "data:image/png;base64,AAAA", "#filter", ""] {
            assert_eq!(resolve("css/app.css", url), None, "{url}");
        }
    }

    #[test]
    fn rewrites_urls_and_imports() {
        let src = "@import \"base.css\";\n.logo { background: url(../img/logo.png?v=1) }\n@font-face { font-family: A; src: url('../fonts/a.woff2') }\n";
        let rw = rewrite("css/app.css", src.as_bytes(), lookup).unwrap();
        let out = rw.content.unwrap();
        assert!(out.contains("base.aaaaaaaaaaaa.css"), "{out}");
        assert!(out.contains("../img/logo.0123456789ab.png?v=1"), "{out}");
        assert!(out.contains("../fonts/a.ba9876543210.woff2"), "{out}");
        assert!(!out.contains("logo.png"), "{out}");
        assert!(rw.unresolved.is_empty());
    }

    #[test]
    fn unknown_targets_are_kept_and_reported_once() {
        let src = ".a { background: url(missing.png) }\n.b { background: url(missing.png) }\n.c { background: url(https://example.com/x.png) }\n";
        let rw = rewrite("app.css", src.as_bytes(), lookup).unwrap();
        assert!(rw.content.is_none());
        assert_eq!(rw.unresolved, vec![Box::<str>::from("missing.png")]);
    }

    #[test]
    fn lists_local_targets() {
        let src = "@import url(base.css);\n.a { background: url(../img/logo.png) }\n.b { background: url(data:image/gif;base64,R0lGOD) }\n";
        assert_eq!(targets("css/app.css", src.as_bytes()), vec!["css/base.css", "img/logo.png"]);
        assert!(targets("css/app.css", b"\xff\xfe.a{}").is_empty());
    }

    #[test]
    fn style_sheets_by_extension() {
        assert!(is_style_sheet("css/app.css"));
        assert!(is_style_sheet("A.CSS"));
        assert!(!is_style_sheet("app.js"));
    }
}
