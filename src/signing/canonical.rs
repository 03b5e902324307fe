//! Canonical request building for AWS Signature V4.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::{BTreeMap, BTreeSet};

/// Characters left unencoded in URI paths.
const URI_PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Characters left unencoded in query components and path segments.
const QUERY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// URI-encode a path, keeping `/` separators.
pub fn uri_encode_path(path: &str) -> String {
    utf8_percent_encode(path, URI_PATH_SET).to_string()
}

/// URI-encode a query component.
pub fn uri_encode_query(value: &str) -> String {
    utf8_percent_encode(value, QUERY_SET).to_string()
}

/// Build the canonical URI from an already percent-encoded request path.
///
/// S3 signs the path exactly as sent. Every other service encodes each
/// segment a second time.
pub fn build_canonical_uri(path: &str, double_encode: bool) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    if !double_encode {
        return normalized;
    }

    normalized
        .split('/')
        .map(uri_encode_query)
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the canonical query string.
///
/// The input is a raw `a=1&b=2` query as it appears on the URL. Each pair is
/// decoded, re-encoded strictly, then sorted by name and value.
pub fn build_canonical_query_string(query_string: &str) -> String {
    if query_string.is_empty() {
        return String::new();
    }

    let mut params: Vec<(String, String)> = url::form_urlencoded::parse(query_string.as_bytes())
        .map(|(k, v)| (uri_encode_query(&k), uri_encode_query(&v)))
        .collect();

    params.sort();

    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the canonical headers block.
///
/// Names are lowercased and sorted; values are trimmed with inner whitespace
/// collapsed. Repeated headers are comma-joined.
pub fn build_canonical_headers(headers: &[(String, String)]) -> String {
    let mut header_map: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (name, value) in headers {
        let name_lower = name.to_lowercase();
        if !super::should_sign_header(&name_lower) {
            continue;
        }

        let trimmed = value.split_whitespace().collect::<Vec<_>>().join(" ");
        header_map.entry(name_lower).or_default().push(trimmed);
    }

    header_map
        .iter()
        .map(|(name, values)| format!("{}:{}\n", name, values.join(",")))
        .collect()
}

/// Build the semicolon-separated signed headers list.
pub fn build_signed_headers(headers: &[(String, String)]) -> String {
    headers
        .iter()
        .map(|(name, _)| name.to_lowercase())
        .filter(|name| super::should_sign_header(name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(";")
}

/// Build the canonical request string.
///
/// ```text
/// HTTPMethod\n
/// CanonicalURI\n
/// CanonicalQueryString\n
/// CanonicalHeaders\n
/// SignedHeaders\n
/// HashedPayload
/// ```
pub fn build_canonical_request(
    method: &str,
    canonical_uri: &str,
    query_string: &str,
    headers: &[(String, String)],
    payload_hash: &str,
) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method.to_uppercase(),
        canonical_uri,
        build_canonical_query_string(query_string),
        build_canonical_headers(headers),
        build_signed_headers(headers),
        payload_hash
    )
}
