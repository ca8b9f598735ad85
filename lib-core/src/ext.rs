
/// An enum containing all "known" file formats that can be handled by this library
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KnownFmt {
    /// Cascading Style Sheets
    Css,
    /// JavaScript (including ES and CommonJS modules)
    Js,
    /// JavaScript Object Notation (also source maps and web manifests)
    Json,
    /// HyperText Markup Language
    Html,
    /// Plain text
    Txt,
    /// Scalable Vector Graphics
    Svg,
    /// Extensible Markup Language
    Xml,
    /// A raster image format (PNG, JPEG, GIF, WebP, AVIF, ICO)
    Image,
    /// A web font format (WOFF, WOFF2)
    Font,
    /// An archive or an already compressed stream (ZIP, GZip, Brotli)
    Compressed,
    /// Any other format
    Other
}
impl KnownFmt {
    /// Return a `KnownFmt` based on file extension (case-insensitive).
    #[must_use]
    pub fn by_extension(ftype: &str) -> Self {
        match ftype.to_ascii_lowercase().as_str() {
            "css" => Self::Css,
            "js" | "mjs" | "cjs" => Self::Js,
            "json" | "map" | "webmanifest" => Self::Json,
            "html" | "htm" => Self::Html,
            "txt" => Self::Txt,
            "svg" => Self::Svg,
            "xml" => Self::Xml,
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "avif" | "ico" => Self::Image,
            "woff" | "woff2" => Self::Font,
            "zip" | "gz" | "br" | "zst" => Self::Compressed,
            _ => Self::Other
        }
    }

    /// Checks if the format is already compressed, so another encoding gains almost nothing.
    #[must_use]
    pub const fn is_precompressed(self) -> bool {
        matches!(self, Self::Image | Self::Font | Self::Compressed)
    }
}

/// Splits a logical name into its extension (without a dot), if the last path segment has one.
/// A leading dot (`.htaccess`) does not start an extension.
#[must_use]
pub fn extension_of(name: &str) -> Option<&str> {
    let base = name.rsplit('/').next().unwrap_or(name);
    match base.rfind('.') {
        Some(0) | None => None,
        Some(i) => Some(&base[i + 1..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(KnownFmt::by_extension("CSS"), KnownFmt::Css);
        assert_eq!(KnownFmt::by_extension("Mjs"), KnownFmt::Js);
        assert_eq!(KnownFmt::by_extension("woff2"), KnownFmt::Font);
        assert_eq!(KnownFmt::by_extension("foo"), KnownFmt::Other);
    }

    #[test]
    fn extension_of_last_segment() {
        assert_eq!(extension_of("css/app.css"), Some("css"));
        assert_eq!(extension_of("js/jquery.min.js"), Some("js"));
        assert_eq!(extension_of("v1.2/LICENSE"), None);
        assert_eq!(extension_of(".htaccess"), None);
        assert_eq!(extension_of("dir/.htaccess"), None);
    }
}
