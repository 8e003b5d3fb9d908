//! Validation of raw request parameters before they reach the read path.
//!
//! Every helper returns `None` (or the default) for input it cannot accept;
//! the request layer turns that into its own error page.

use url::Url;

/// Normalizes a viewer path: duplicate separators collapse, a trailing
/// separator is stripped (root stays `/`). Empty or relative input is
/// rejected.
pub fn validate_path(path: &str) -> Option<String> {
    if path.is_empty() || !path.starts_with('/') {
        return None;
    }
    let mut normalized = String::with_capacity(path.len());
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    Some(normalized)
}

/// Parses an optional numeric parameter; absent or unparsable input is
/// `None`.
pub fn validate_long(value: Option<&str>) -> Option<i64> {
    value?.parse().ok()
}

/// Parses and re-encodes a URL parameter so it can be embedded in a query
/// string. Anything the `url` crate rejects is rejected here.
pub fn validate_url(value: &str) -> Option<String> {
    let url = Url::parse(value).ok()?;
    Some(url::form_urlencoded::byte_serialize(url.as_str().as_bytes()).collect())
}

/// Chunk-size parameter with a fallback: anything that is not a positive
/// integer yields the default.
pub fn chunk_size_to_view(value: Option<&str>, default: u64) -> u64 {
    match value.and_then(|raw| raw.parse::<u64>().ok()) {
        Some(n) if n > 0 => n,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeouts::DEFAULT_CHUNK_SIZE_TO_VIEW;

    #[test]
    fn path_normalization() {
        assert_eq!(validate_path("/a//b/"), Some("/a/b".to_string()));
        assert_eq!(validate_path("/"), Some("/".to_string()));
        assert_eq!(validate_path("///"), Some("/".to_string()));
        assert_eq!(validate_path(""), None);
        assert_eq!(validate_path("relative/path"), None);
    }

    #[test]
    fn long_parsing() {
        assert_eq!(validate_long(Some("42")), Some(42));
        assert_eq!(validate_long(Some("-7")), Some(-7));
        assert_eq!(validate_long(Some("4x2")), None);
        assert_eq!(validate_long(None), None);
    }

    #[test]
    fn url_validation_encodes_for_query_strings() {
        let encoded = validate_url("http://nn-1:50070/view?dir=/a b").unwrap();
        assert!(!encoded.contains(' '));
        assert!(encoded.starts_with("http"));
        assert_eq!(validate_url("not a url"), None);
    }

    #[test]
    fn chunk_size_falls_back_to_default() {
        assert_eq!(chunk_size_to_view(Some("512"), DEFAULT_CHUNK_SIZE_TO_VIEW), 512);
        assert_eq!(
            chunk_size_to_view(Some("0"), DEFAULT_CHUNK_SIZE_TO_VIEW),
            DEFAULT_CHUNK_SIZE_TO_VIEW
        );
        assert_eq!(
            chunk_size_to_view(Some("junk"), DEFAULT_CHUNK_SIZE_TO_VIEW),
            DEFAULT_CHUNK_SIZE_TO_VIEW
        );
        assert_eq!(
            chunk_size_to_view(None, DEFAULT_CHUNK_SIZE_TO_VIEW),
            DEFAULT_CHUNK_SIZE_TO_VIEW
        );
    }
}
