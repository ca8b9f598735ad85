//! Content fingerprints used for cache-busting names.
//!
//! A fingerprint is the first [`TOKEN_LEN`] hex characters of the SHA-256 digest of the
//! bytes that are actually served, so it changes if and only if the served content changes.

use sha2::{Digest, Sha256};

/// Length of a fingerprint token in hex characters.
pub const TOKEN_LEN: usize = 12;

/// Computes a fingerprint token of content.
#[must_use]
pub fn fingerprint(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    hex::encode(&digest[..TOKEN_LEN / 2])
}

/// Inserts a token before the extension of the last path segment.
///
/// `css/app.css` becomes `css/app.{token}.css`; names without an extension
/// (or with only a leading dot, like `.htaccess`) get the token appended.
#[must_use]
pub fn hashed_name(logical: &str, token: &str) -> String {
    let (stem, ext) = logical.split_at(token_position(logical));
    let mut out = String::with_capacity(logical.len() + token.len() + 1);
    out.push_str(stem);
    out.push('.');
    out.push_str(token);
    out.push_str(ext);
    out
}

/// Extracts the token from a name made by [`hashed_name`] for the same logical name.
#[must_use]
pub fn token_of<'a>(logical: &str, hashed: &'a str) -> Option<&'a str> {
    let len = hashed.len().checked_sub(logical.len() + 1)?;
    let at = token_position(logical) + 1;
    let token = hashed.get(at..at + len)?;
    (hashed_name(logical, token) == hashed).then_some(token)
}

/// Byte offset where `.{token}` is inserted: before the extension of the last segment, or at the end.
fn token_position(logical: &str) -> usize {
    let base_start = logical.rfind('/').map_or(0, |i| i + 1);
    match logical[base_start..].rfind('.') {
        Some(i) if i > 0 => base_start + i,
        _ => logical.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_fixed_length_hex() {
        let t = fingerprint(b"body{color:red}");
        assert_eq!(t.len(), TOKEN_LEN);
        assert!(t.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        assert_eq!(t, fingerprint(b"body{color:red}"));
    }

    #[test]
    fn one_byte_changes_fingerprint() {
        assert_ne!(fingerprint(b"body{color:red}"), fingerprint(b"body{color:red }"));
    }

    #[test]
    fn empty_content_has_known_digest() {
        // sha256("") = e3b0c44298fc1c14...
        assert_eq!(fingerprint(b""), "e3b0c44298fc");
    }

    #[test]
    fn token_goes_before_extension() {
        assert_eq!(hashed_name("app.css", "abc"), "app.abc.css");
        assert_eq!(hashed_name("css/app.css", "abc"), "css/app.abc.css");
        assert_eq!(hashed_name("js/jquery.min.js", "abc"), "js/jquery.min.abc.js");
    }

    #[test]
    fn names_without_extension() {
        assert_eq!(hashed_name("LICENSE", "abc"), "LICENSE.abc");
        assert_eq!(hashed_name("v1.2/LICENSE", "abc"), "v1.2/LICENSE.abc");
        assert_eq!(hashed_name("conf/.htaccess", "abc"), "conf/.htaccess.abc");
    }

    #[test]
    fn token_is_recovered_from_hashed_names() {
        let t = fingerprint(b"a{}");
        for logical in ["app.css", "css/jquery.min.js", "LICENSE", "conf/.htaccess"] {
            assert_eq!(token_of(logical, &hashed_name(logical, &t)), Some(&*t));
        }
        assert_eq!(token_of("app.css", "app.css"), None);
        assert_eq!(token_of("app.css", "other.abc.css"), None);
    }
}
