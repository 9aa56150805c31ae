//! URL helpers
//!
//! Derives destination file names from source locations.

/// Extract a file name from a URL's final path segment.
///
/// Handles query strings and fragments, returns "download" when the URL has
/// no path.
///
/// # Example
/// ```ignore
/// assert_eq!(extract_filename("https://example.com/foo-1.0.tar.gz"), "foo-1.0.tar.gz");
/// assert_eq!(extract_filename("https://example.com/file?v=1"), "file");
/// ```
pub fn extract_filename(url: &str) -> String {
    let clean_url = url.split(['?', '#']).next().unwrap_or(url);

    // Host-only URLs have no segment to name the file after
    let without_scheme = clean_url
        .split_once("://")
        .map_or(clean_url, |(_, rest)| rest);
    let Some((_, path)) = without_scheme.split_once('/') else {
        return "download".to_string();
    };

    path.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| sanitize_filename(&percent_decode(s)))
        .unwrap_or_else(|| "download".to_string())
}

/// Simple percent-decoding for URL paths.
pub fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let Some(byte) = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        {
            out.push(byte);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Sanitize a filename for safe filesystem use.
///
/// Replaces problematic characters and handles special names.
pub fn sanitize_filename(name: &str) -> String {
    if name.is_empty() || name == "." || name == ".." {
        return "download".to_string();
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim().trim_matches('.');

    if trimmed.is_empty() {
        "download".to_string()
    } else {
        trimmed.to_string()
    }
}
